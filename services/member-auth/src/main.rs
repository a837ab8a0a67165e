//! Member Auth Service - 验证码登录服务入口

use std::net::SocketAddr;
use std::sync::Arc;

use member_auth::api::http::{AppState, router};
use member_auth::container::{ServiceContainer, ServiceDependencies};
use member_auth::domain::otp::SecureCodeGenerator;
use member_auth::domain::repositories::{AccountRepository, MemberProfileRepository};
use member_auth::infrastructure::persistence::{
    InMemoryAccountRepository, InMemoryMemberProfileRepository, MIGRATOR, PostgresAccountRepository,
    PostgresMemberProfileRepository,
};
use member_auth::infrastructure::session::TokenSessionManager;
use portal_adapter_postgres::migrate;
use portal_bootstrap::{Infrastructure, init_runtime, shutdown_signal};
use portal_config::AppConfig;
use portal_ports::SystemClock;
use portal_telemetry::init_metrics;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 本地开发时从 .env 读取 PORTAL_* 变量
    dotenvy::dotenv().ok();

    let config = AppConfig::load("config")?;
    init_runtime(&config);

    let metrics_handle = match init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    };

    let infra = Infrastructure::from_config(config).await?;
    let config = infra.config();

    // 组装 Repositories：配置了数据库则使用 PostgreSQL
    let (accounts, profiles): (Arc<dyn AccountRepository>, Arc<dyn MemberProfileRepository>) =
        match infra.postgres_pool() {
            Some(pool) => {
                migrate(&pool, &MIGRATOR).await?;
                (
                    Arc::new(PostgresAccountRepository::new(pool.clone())),
                    Arc::new(PostgresMemberProfileRepository::new(pool)),
                )
            }
            None => (
                Arc::new(InMemoryAccountRepository::new()),
                Arc::new(InMemoryMemberProfileRepository::new()),
            ),
        };

    let sessions = Arc::new(TokenSessionManager::new(infra.token_service(), infra.cache()));

    let services = ServiceContainer::new(ServiceDependencies {
        cache: infra.cache(),
        accounts,
        profiles,
        sessions,
        email_sender: infra.email_sender(),
        code_generator: Arc::new(SecureCodeGenerator),
        clock: Arc::new(SystemClock),
        otp: config.otp.clone(),
        portal: config.portal.clone(),
    });

    let mut state = AppState::new(services);
    if let Some(handle) = metrics_handle {
        state = state.with_metrics(handle);
    }
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, "Starting member-auth service");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Member-auth service stopped");
    Ok(())
}
