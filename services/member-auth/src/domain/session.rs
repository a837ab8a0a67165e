//! 会话

use async_trait::async_trait;
use portal_errors::AppResult;

use crate::domain::account::Account;

/// 新建立的会话
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub account_id: String,
    pub token: String,
    /// 剩余有效期（秒）
    pub expires_in: i64,
}

/// 通过令牌认证后的会话
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub session_id: String,
    pub account_id: String,
    pub roles: Vec<String>,
}

/// 会话管理
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// 为账号建立会话
    async fn establish(&self, account: &Account) -> AppResult<Session>;

    /// 校验令牌并确认会话未被撤销
    async fn authenticate(&self, token: &str) -> AppResult<AuthenticatedSession>;

    /// 撤销会话，会话已不存在时不报错
    async fn revoke(&self, token: &str) -> AppResult<()>;
}
