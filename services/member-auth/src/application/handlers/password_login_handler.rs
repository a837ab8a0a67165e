//! 密码登录处理器

use std::sync::Arc;

use async_trait::async_trait;
use portal_errors::{AppError, AppResult};
use tracing::{info, warn};

use crate::application::CommandHandler;
use crate::application::commands::{LoginResult, LoginWithPasswordCommand};
use crate::domain::services::AccountService;
use crate::domain::session::SessionManager;
use crate::infrastructure::observability::metrics;

/// 密码登录处理器
pub struct PasswordLoginHandler {
    account_service: Arc<AccountService>,
    sessions: Arc<dyn SessionManager>,
    home_page: String,
}

impl PasswordLoginHandler {
    pub fn new(
        account_service: Arc<AccountService>,
        sessions: Arc<dyn SessionManager>,
        home_page: impl Into<String>,
    ) -> Self {
        Self {
            account_service,
            sessions,
            home_page: home_page.into(),
        }
    }
}

#[async_trait]
impl CommandHandler<LoginWithPasswordCommand> for PasswordLoginHandler {
    async fn handle(&self, command: LoginWithPasswordCommand) -> AppResult<LoginResult> {
        info!("Handling LoginWithPassword command");

        if command.identifier.trim().is_empty() || command.password.is_empty() {
            return Err(AppError::validation("Email/Mobile and password are required"));
        }

        let account = match self
            .account_service
            .authenticate_with_password(&command.identifier, &command.password)
            .await
        {
            Ok(account) => account,
            Err(e) => {
                warn!(identifier = %command.identifier, "Password login failed");
                metrics::record_password_login(false);
                return Err(e);
            }
        };

        let session = self.sessions.establish(&account).await?;
        metrics::record_password_login(true);

        info!(account_id = %account.id, "Password login succeeded");

        Ok(LoginResult {
            message: "Logged in successfully".to_string(),
            home_page: self.home_page.clone(),
            token: session.token,
            expires_in: session.expires_in,
        })
    }
}
