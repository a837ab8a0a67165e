//! 会员档案处理器

use std::sync::Arc;

use async_trait::async_trait;
use portal_errors::{AppError, AppResult};
use tracing::info;

use crate::application::commands::{SaveMemberProfileCommand, SaveProfileResult};
use crate::application::queries::{GetMemberProfileQuery, MemberProfileView};
use crate::application::{CommandHandler, QueryHandler};
use crate::domain::repositories::AccountRepository;
use crate::domain::services::ProfileService;
use crate::domain::session::SessionManager;
use crate::infrastructure::observability::metrics;

/// 读取档案处理器
pub struct GetMemberProfileHandler {
    profile_service: Arc<ProfileService>,
    accounts: Arc<dyn AccountRepository>,
    sessions: Arc<dyn SessionManager>,
}

impl GetMemberProfileHandler {
    pub fn new(
        profile_service: Arc<ProfileService>,
        accounts: Arc<dyn AccountRepository>,
        sessions: Arc<dyn SessionManager>,
    ) -> Self {
        Self {
            profile_service,
            accounts,
            sessions,
        }
    }
}

#[async_trait]
impl QueryHandler<GetMemberProfileQuery> for GetMemberProfileHandler {
    async fn handle(&self, query: GetMemberProfileQuery) -> AppResult<MemberProfileView> {
        let session = self.sessions.authenticate(&query.access_token).await?;

        if let Some(profile) = self.profile_service.get_profile(&session.account_id).await? {
            return Ok(profile.into());
        }

        let email = self
            .accounts
            .find_by_id(&session.account_id)
            .await?
            .map(|account| account.email)
            .unwrap_or_else(|| session.account_id.clone());
        Ok(MemberProfileView::blank(session.account_id, email))
    }
}

/// 保存档案处理器
pub struct SaveMemberProfileHandler {
    profile_service: Arc<ProfileService>,
    sessions: Arc<dyn SessionManager>,
}

impl SaveMemberProfileHandler {
    pub fn new(profile_service: Arc<ProfileService>, sessions: Arc<dyn SessionManager>) -> Self {
        Self {
            profile_service,
            sessions,
        }
    }
}

#[async_trait]
impl CommandHandler<SaveMemberProfileCommand> for SaveMemberProfileHandler {
    async fn handle(&self, command: SaveMemberProfileCommand) -> AppResult<SaveProfileResult> {
        info!("Handling SaveMemberProfile command");

        let session = self.sessions.authenticate(&command.access_token).await?;

        match self
            .profile_service
            .save_profile(&session.account_id, &command.changes)
            .await
        {
            Ok(profile) => {
                metrics::record_profile_save("saved");
                Ok(SaveProfileResult {
                    message: "Profile saved successfully".to_string(),
                    name: profile.id,
                })
            }
            Err(e) => {
                let outcome = match &e {
                    AppError::Validation(_) => "duplicate_mobile",
                    _ => "error",
                };
                metrics::record_profile_save(outcome);
                Err(e)
            }
        }
    }
}
