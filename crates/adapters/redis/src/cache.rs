//! 基于 `ConnectionManager` 的 `CachePort` 实现

use async_trait::async_trait;
use portal_errors::{AppError, AppResult};
use portal_ports::CachePort;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use std::time::Duration;
use tracing::debug;

fn redis_error(op: &'static str) -> impl FnOnce(RedisError) -> AppError {
    move |e| AppError::external_service(format!("Redis {} failed: {}", op, e))
}

/// Redis 缓存，所有键都落在 `{namespace}:` 之下
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    namespace: String,
}

impl RedisCache {
    /// 连接 Redis 并用 PING 确认可用
    pub async fn connect(url: &str, namespace: impl Into<String>) -> AppResult<Self> {
        let client = Client::open(url).map_err(redis_error("client setup"))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(redis_error("connect"))?;

        let cache = Self {
            conn,
            namespace: namespace.into(),
        };
        cache.ping().await?;
        Ok(cache)
    }

    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(redis_error("PING"))?;
        Ok(())
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }
}

#[async_trait]
impl CachePort for RedisCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(self.key(key)).await.map_err(redis_error("GET"))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let key = self.key(key);
        debug!(key = %key, ttl = ?ttl, "cache write");

        let Some(ttl) = ttl else {
            return conn.set(key, value).await.map_err(redis_error("SET"));
        };
        // PSETEX 要求正数
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        conn.pset_ex(key, value, millis)
            .await
            .map_err(redis_error("PSETEX"))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.del(self.key(key)).await.map_err(redis_error("DEL"))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        conn.exists(self.key(key)).await.map_err(redis_error("EXISTS"))
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        let mut conn = self.conn.clone();
        let millis: i64 = conn.pttl(self.key(key)).await.map_err(redis_error("PTTL"))?;

        // 负数：键不存在（-2）或未设置过期（-1）
        Ok(u64::try_from(millis).ok().map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // 需要本地 Redis
    async fn test_otp_key_expires() {
        let cache = RedisCache::connect("redis://127.0.0.1:6379", "member-auth-test")
            .await
            .unwrap();

        cache.delete("otp:verify:user@example.com").await.unwrap();
        assert!(cache.get("otp:verify:user@example.com").await.unwrap().is_none());

        cache
            .set("otp:verify:user@example.com", "{}", Some(Duration::from_millis(200)))
            .await
            .unwrap();
        assert!(cache.exists("otp:verify:user@example.com").await.unwrap());
        assert!(cache.ttl("otp:verify:user@example.com").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(cache.get("otp:verify:user@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore] // 需要本地 Redis
    async fn test_counter_without_ttl() {
        let cache = RedisCache::connect("redis://127.0.0.1:6379", "member-auth-test")
            .await
            .unwrap();

        cache.set("otp:limit:x", "1", None).await.unwrap();
        assert_eq!(cache.ttl("otp:limit:x").await.unwrap(), None);
        cache.delete("otp:limit:x").await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let err = RedisCache::connect("not-a-url", "x").await.err().unwrap();
        assert_eq!(err.status_code(), 502);
    }
}
