//! Cache trait 定义

use async_trait::async_trait;
use portal_errors::AppResult;
use std::time::Duration;

/// 带过期时间的键值缓存
///
/// 过期的键在读取时视为不存在。实现不需要提供跨调用的原子性，
/// 调用方以“先读后写”的方式使用。
#[async_trait]
pub trait CachePort: Send + Sync {
    /// 获取缓存值
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// 设置缓存值，覆盖已有值及其过期时间
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()>;

    /// 删除缓存，键不存在时不报错
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// 检查是否存在
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// 剩余存活时间，键不存在或没有过期时间时返回 None
    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>>;
}
