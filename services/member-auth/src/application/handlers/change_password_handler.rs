//! 修改密码处理器

use std::sync::Arc;

use async_trait::async_trait;
use portal_errors::{AppError, AppResult};
use tracing::info;

use crate::application::CommandHandler;
use crate::application::commands::{ChangePasswordCommand, MessageResult};
use crate::domain::password::Password;
use crate::domain::services::AccountService;
use crate::domain::session::SessionManager;

/// 修改密码处理器
pub struct ChangePasswordHandler {
    account_service: Arc<AccountService>,
    sessions: Arc<dyn SessionManager>,
}

impl ChangePasswordHandler {
    pub fn new(account_service: Arc<AccountService>, sessions: Arc<dyn SessionManager>) -> Self {
        Self {
            account_service,
            sessions,
        }
    }
}

#[async_trait]
impl CommandHandler<ChangePasswordCommand> for ChangePasswordHandler {
    async fn handle(&self, command: ChangePasswordCommand) -> AppResult<MessageResult> {
        info!("Handling ChangePassword command");

        let session = self.sessions.authenticate(&command.access_token).await?;

        if command.new_password.is_empty() {
            return Err(AppError::validation("New password is required"));
        }
        let password = Password::new(command.new_password)?;

        self.account_service
            .change_password(&session.account_id, &password)
            .await?;

        Ok(MessageResult::new("Password updated successfully"))
    }
}
