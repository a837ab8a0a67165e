//! 登出处理器

use std::sync::Arc;

use async_trait::async_trait;
use portal_errors::AppResult;
use tracing::info;

use crate::application::CommandHandler;
use crate::application::commands::{LogoutCommand, MessageResult};
use crate::domain::session::SessionManager;

/// 登出处理器
pub struct LogoutHandler {
    sessions: Arc<dyn SessionManager>,
}

impl LogoutHandler {
    pub fn new(sessions: Arc<dyn SessionManager>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl CommandHandler<LogoutCommand> for LogoutHandler {
    async fn handle(&self, command: LogoutCommand) -> AppResult<MessageResult> {
        info!("Handling Logout command");

        self.sessions.revoke(&command.access_token).await?;
        Ok(MessageResult::new("Logged out successfully"))
    }
}
