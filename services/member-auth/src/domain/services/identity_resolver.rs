//! 账号身份解析
//!
//! 按顺序尝试各个解析步骤，返回第一个命中的账号 ID；
//! 全部未命中时回退为原始标识。

use std::fmt;
use std::sync::Arc;

use portal_errors::AppResult;
use tracing::debug;

use crate::domain::repositories::{AccountRepository, MemberProfileRepository};

/// 解析步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    /// 以原始标识为 ID 的账号
    DirectAccount,
    /// 档案邮箱匹配
    ProfileEmail,
    /// 档案手机号匹配
    ProfileMobile,
}

impl fmt::Display for ResolutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolutionStep::DirectAccount => "direct_account",
            ResolutionStep::ProfileEmail => "profile_email",
            ResolutionStep::ProfileMobile => "profile_mobile",
        };
        f.write_str(name)
    }
}

/// 默认顺序
pub const DEFAULT_RESOLUTION_ORDER: [ResolutionStep; 3] = [
    ResolutionStep::DirectAccount,
    ResolutionStep::ProfileEmail,
    ResolutionStep::ProfileMobile,
];

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub account_id: String,
    /// 命中的步骤，None 表示回退为原始标识
    pub matched_by: Option<ResolutionStep>,
}

/// 身份解析器
pub struct IdentityResolver {
    accounts: Arc<dyn AccountRepository>,
    profiles: Arc<dyn MemberProfileRepository>,
    steps: Vec<ResolutionStep>,
}

impl IdentityResolver {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        profiles: Arc<dyn MemberProfileRepository>,
    ) -> Self {
        Self {
            accounts,
            profiles,
            steps: DEFAULT_RESOLUTION_ORDER.to_vec(),
        }
    }

    /// 自定义解析顺序
    pub fn with_steps(mut self, steps: Vec<ResolutionStep>) -> Self {
        self.steps = steps;
        self
    }

    pub async fn resolve(&self, identifier: &str) -> AppResult<ResolvedIdentity> {
        for step in &self.steps {
            if let Some(account_id) = self.try_step(*step, identifier).await? {
                debug!(identifier = %identifier, account_id = %account_id, step = %step, "Identity resolved");
                return Ok(ResolvedIdentity {
                    account_id,
                    matched_by: Some(*step),
                });
            }
        }

        debug!(identifier = %identifier, "No linked account, falling back to raw identifier");
        Ok(ResolvedIdentity {
            account_id: identifier.to_string(),
            matched_by: None,
        })
    }

    async fn try_step(&self, step: ResolutionStep, identifier: &str) -> AppResult<Option<String>> {
        match step {
            ResolutionStep::DirectAccount => Ok(self
                .accounts
                .exists(identifier)
                .await?
                .then(|| identifier.to_string())),
            ResolutionStep::ProfileEmail => self.profiles.find_user_by_email(identifier).await,
            ResolutionStep::ProfileMobile => self.profiles.find_user_by_mobile(identifier).await,
        }
    }
}
