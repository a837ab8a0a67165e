//! 基于 JWT 与缓存的会话管理
//!
//! 令牌本身携带过期时间，缓存中的 `session:{jti}` 用于在过期前撤销。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use portal_auth_core::TokenService;
use portal_errors::{AppError, AppResult};
use portal_ports::CachePort;
use tracing::{debug, info, warn};

use crate::domain::account::Account;
use crate::domain::session::{AuthenticatedSession, Session, SessionManager};

const SESSION_KEY_PREFIX: &str = "session:";

/// Token 会话管理
pub struct TokenSessionManager {
    token_service: Arc<TokenService>,
    cache: Arc<dyn CachePort>,
}

impl TokenSessionManager {
    pub fn new(token_service: Arc<TokenService>, cache: Arc<dyn CachePort>) -> Self {
        Self {
            token_service,
            cache,
        }
    }

    fn session_key(session_id: &str) -> String {
        format!("{}{}", SESSION_KEY_PREFIX, session_id)
    }
}

#[async_trait]
impl SessionManager for TokenSessionManager {
    async fn establish(&self, account: &Account) -> AppResult<Session> {
        let issued = self.token_service.issue(&account.id, account.roles.clone())?;
        let expires_in = self.token_service.lifetime_secs();
        let ttl = Duration::from_secs(expires_in.max(1) as u64);

        self.cache
            .set(&Self::session_key(&issued.claims.jti), &account.id, Some(ttl))
            .await?;

        info!(account_id = %account.id, session_id = %issued.claims.jti, "Session established");

        Ok(Session {
            session_id: issued.claims.jti,
            account_id: account.id.clone(),
            token: issued.token,
            expires_in,
        })
    }

    async fn authenticate(&self, token: &str) -> AppResult<AuthenticatedSession> {
        let claims = self.token_service.verify(token)?;

        match self.cache.get(&Self::session_key(&claims.jti)).await? {
            Some(account_id) if account_id == claims.sub => Ok(AuthenticatedSession {
                session_id: claims.jti,
                account_id,
                roles: claims.roles,
            }),
            Some(_) => {
                warn!(session_id = %claims.jti, "Session owner does not match token subject");
                Err(AppError::unauthenticated("Session expired or revoked"))
            }
            None => {
                debug!(session_id = %claims.jti, "Session not found");
                Err(AppError::unauthenticated("Session expired or revoked"))
            }
        }
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        let claims = self.token_service.verify(token)?;
        self.cache.delete(&Self::session_key(&claims.jti)).await?;

        info!(account_id = %claims.sub, session_id = %claims.jti, "Session revoked");
        Ok(())
    }
}
