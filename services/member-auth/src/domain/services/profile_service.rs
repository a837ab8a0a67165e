//! 会员档案服务
//!
//! 读取与保存账号自己的档案，保存后把姓名、手机号等同步到账号

use std::sync::Arc;

use portal_errors::{AppError, AppResult};
use portal_ports::Clock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::member_profile::{MemberProfile, ProfileChanges};
use crate::domain::repositories::{AccountRepository, MemberProfileRepository};

/// 手机号已被其他账号的档案占用
pub const MOBILE_ALREADY_REGISTERED: &str = "This mobile number is already registered with another user";

pub struct ProfileService {
    profiles: Arc<dyn MemberProfileRepository>,
    accounts: Arc<dyn AccountRepository>,
    clock: Arc<dyn Clock>,
}

impl ProfileService {
    pub fn new(
        profiles: Arc<dyn MemberProfileRepository>,
        accounts: Arc<dyn AccountRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            profiles,
            accounts,
            clock,
        }
    }

    pub async fn get_profile(&self, account_id: &str) -> AppResult<Option<MemberProfile>> {
        self.profiles.find_by_user(account_id).await
    }

    /// 创建或更新档案
    ///
    /// 账号同步失败只记录日志，档案保存结果不受影响。
    pub async fn save_profile(
        &self,
        account_id: &str,
        changes: &ProfileChanges,
    ) -> AppResult<MemberProfile> {
        if let Some(mobile) = changes.mobile() {
            if let Some(owner) = self.profiles.find_user_by_mobile(mobile).await? {
                if owner != account_id {
                    warn!(account_id = %account_id, "Mobile number already registered to another profile");
                    return Err(AppError::validation(MOBILE_ALREADY_REGISTERED));
                }
            }
        }

        let mut profile = match self.profiles.find_by_user(account_id).await? {
            Some(profile) => profile,
            None => MemberProfile::new(format!("MP-{}", Uuid::now_v7()), account_id),
        };
        profile.apply(changes);

        self.profiles.save(&profile).await.map_err(|e| match e {
            AppError::Conflict(_) => AppError::validation(MOBILE_ALREADY_REGISTERED),
            other => other,
        })?;
        info!(account_id = %account_id, profile_id = %profile.id, "Member profile saved");

        if let Err(e) = self.sync_account(account_id, changes).await {
            error!(account_id = %account_id, error = %e, "Failed to sync profile to account");
        }

        Ok(profile)
    }

    async fn sync_account(&self, account_id: &str, changes: &ProfileChanges) -> AppResult<()> {
        let Some(mut account) = self.accounts.find_by_id(account_id).await? else {
            return Err(AppError::not_found("Account not found"));
        };
        if account.sync_from_profile(changes, self.clock.now()) {
            self.accounts.update(&account).await?;
        }
        Ok(())
    }
}
