use portal_config::DatabaseConfig;
use portal_errors::{AppError, AppResult};
use secrecy::ExposeSecret;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// 按配置建立连接池，并立即探测一次
pub async fn connect(config: &DatabaseConfig) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .test_before_acquire(true)
        .connect(config.url.expose_secret())
        .await
        .map_err(|e| AppError::database(format!("Cannot open account database: {}", e)))?;

    ping(&pool).await?;
    info!(max_connections = config.max_connections, "Account database connected");
    Ok(pool)
}

pub async fn ping(pool: &PgPool) -> AppResult<()> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
        .map_err(|e| AppError::database(format!("Account database unreachable: {}", e)))
}

/// 应用服务自带的迁移集
pub async fn migrate(pool: &PgPool, migrator: &Migrator) -> AppResult<()> {
    migrator
        .run(pool)
        .await
        .map_err(|e| AppError::database(format!("Migration failed: {}", e)))?;

    info!(count = migrator.iter().count(), "Schema up to date");
    Ok(())
}
