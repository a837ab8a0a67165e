//! portal-adapter-postgres - PostgreSQL 连接池与迁移

mod pool;

pub use pool::{connect, migrate, ping};
