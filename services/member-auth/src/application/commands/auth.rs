//! 密码登录与会话命令

use serde::{Deserialize, Serialize};

use super::MessageResult;
use crate::application::Command;

/// 密码登录命令
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginWithPasswordCommand {
    /// 邮箱或手机号
    pub identifier: String,
    pub password: String,
}

impl Command for LoginWithPasswordCommand {
    type Result = LoginResult;
}

/// 密码登录结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    pub message: String,
    pub home_page: String,
    pub token: String,
    pub expires_in: i64,
}

/// 修改密码命令
#[derive(Clone)]
pub struct ChangePasswordCommand {
    pub access_token: String,
    pub new_password: String,
}

impl Command for ChangePasswordCommand {
    type Result = MessageResult;
}

/// 登出命令
#[derive(Debug, Clone)]
pub struct LogoutCommand {
    pub access_token: String,
}

impl Command for LogoutCommand {
    type Result = MessageResult;
}
