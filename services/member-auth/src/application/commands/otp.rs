//! OTP 命令

use serde::{Deserialize, Serialize};

use super::MessageResult;
use crate::application::Command;

/// 发送验证码命令
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOtpCommand {
    /// 邮箱或手机号
    pub email_or_mobile: String,
}

impl Command for SendOtpCommand {
    type Result = MessageResult;
}

/// 验证码登录命令
#[derive(Clone, Serialize, Deserialize)]
pub struct VerifyOtpCommand {
    pub email_or_mobile: String,
    pub otp: String,
    /// 同时设置的新密码
    pub set_password: Option<String>,
}

impl Command for VerifyOtpCommand {
    type Result = VerifyOtpResult;
}

/// 验证码登录结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpResult {
    pub message: String,
    /// 登录后跳转的页面
    pub home_page: String,
    pub password_set: bool,
    pub token: String,
    pub expires_in: i64,
}
