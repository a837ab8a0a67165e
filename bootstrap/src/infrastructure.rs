//! 基础设施资源管理
//!
//! 统一初始化服务依赖的基础设施资源

use std::sync::Arc;

use portal_adapter_email::{EmailClient, EmailSender, EmailTemplate};
use portal_adapter_memory::MemoryCache;
use portal_adapter_redis::RedisCache;
use portal_auth_core::TokenService;
use portal_config::AppConfig;
use portal_errors::{AppError, AppResult};
use portal_ports::CachePort;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::retry::Backoff;

/// 基础设施资源容器
pub struct Infrastructure {
    /// 应用配置
    config: AppConfig,
    /// 缓存（Redis 或进程内）
    cache: Arc<dyn CachePort>,
    /// PostgreSQL 连接池（未配置时为 None）
    postgres_pool: Option<PgPool>,
    /// Token 服务
    token_service: Arc<TokenService>,
    /// 邮件发送（未配置时为 None）
    email_sender: Option<Arc<dyn EmailSender>>,
}

impl Infrastructure {
    /// 从配置创建基础设施资源（带重试）
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let backoff = Backoff::default();

        // 1. 缓存：配置了 Redis 则使用 Redis，否则退化为进程内缓存
        let cache: Arc<dyn CachePort> = match &config.redis {
            Some(redis) => {
                let cache = backoff
                    .retry("redis", || {
                        RedisCache::connect(redis.url.expose_secret(), config.app_name.as_str())
                    })
                    .await?;
                info!(namespace = %config.app_name, "Redis cache connected");
                Arc::new(cache)
            }
            None => {
                if config.is_production() {
                    warn!("Redis not configured, using in-process cache");
                } else {
                    info!("Redis not configured, using in-process cache");
                }
                Arc::new(MemoryCache::new())
            }
        };

        // 2. PostgreSQL（可选）
        let postgres_pool = match &config.database {
            Some(database) => {
                let pool = backoff
                    .retry("postgres", || portal_adapter_postgres::connect(database))
                    .await?;
                Some(pool)
            }
            None => {
                info!("Database not configured, using in-memory account store");
                None
            }
        };

        // 3. TokenService
        let lifetime_secs = i64::try_from(config.jwt.expires_in).map_err(|_| {
            AppError::validation(format!("jwt.expires_in too large: {}", config.jwt.expires_in))
        })?;
        let token_service = Arc::new(TokenService::new(
            config.jwt.secret.expose_secret(),
            lifetime_secs,
            config.app_name.clone(),
            "member-portal",
        )?);

        // 4. 邮件发送（可选）
        let email_sender: Option<Arc<dyn EmailSender>> = match &config.email {
            Some(email) => {
                let templates = match &email.template_dir {
                    Some(dir) => EmailTemplate::new(dir)?,
                    None => EmailTemplate::builtin()?,
                };
                let client = EmailClient::new(email, templates)?;
                info!(smtp_host = %email.smtp_host, "Email client configured");
                Some(Arc::new(client))
            }
            None => {
                warn!("Email not configured, email OTP delivery will fail and be logged");
                None
            }
        };

        Ok(Self {
            config,
            cache,
            postgres_pool,
            token_service,
            email_sender,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cache(&self) -> Arc<dyn CachePort> {
        self.cache.clone()
    }

    pub fn postgres_pool(&self) -> Option<PgPool> {
        self.postgres_pool.clone()
    }

    pub fn token_service(&self) -> Arc<TokenService> {
        self.token_service.clone()
    }

    pub fn email_sender(&self) -> Option<Arc<dyn EmailSender>> {
        self.email_sender.clone()
    }
}
