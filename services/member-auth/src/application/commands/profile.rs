//! 会员档案命令

use serde::{Deserialize, Serialize};

use crate::application::Command;
use crate::domain::member_profile::ProfileChanges;

/// 保存当前账号的档案
#[derive(Debug, Clone)]
pub struct SaveMemberProfileCommand {
    pub access_token: String,
    pub changes: ProfileChanges,
}

impl Command for SaveMemberProfileCommand {
    type Result = SaveProfileResult;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveProfileResult {
    pub message: String,
    /// 档案 ID
    pub name: String,
}
