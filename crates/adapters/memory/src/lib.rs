//! portal-adapter-memory - 进程内缓存适配器
//!
//! 未配置 Redis 时（开发、测试）使用

mod cache;

pub use cache::*;
