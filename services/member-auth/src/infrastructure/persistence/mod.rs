//! 持久化实现
//!
//! PostgreSQL 用于部署环境，内存实现用于开发与测试

mod memory_account_repository;
mod memory_member_profile_repository;
mod postgres_account_repository;
mod postgres_member_profile_repository;

pub use memory_account_repository::*;
pub use memory_member_profile_repository::*;
pub use postgres_account_repository::*;
pub use postgres_member_profile_repository::*;

use sqlx::migrate::Migrator;

/// 服务自带的数据库迁移
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");
