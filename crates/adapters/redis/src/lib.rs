//! portal-adapter-redis - Redis 缓存适配器

mod cache;

pub use cache::RedisCache;
