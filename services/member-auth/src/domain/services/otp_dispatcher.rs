//! 验证码投递

use std::sync::Arc;

use portal_adapter_email::EmailSender;
use tracing::{error, info, warn};

use crate::domain::identifier::{Channel, Identifier};

/// 验证码邮件主题
pub const OTP_EMAIL_SUBJECT: &str = "Your Verification Code";
/// 验证码邮件模板（`otp_code.html` / `otp_code.txt`）
pub const OTP_EMAIL_TEMPLATE: &str = "otp_code";

/// 投递结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// 已通过邮件发出
    Delivered,
    /// 非邮箱标识，仅写入诊断日志
    Logged,
    /// 投递失败，签发仍然有效
    Failed { reason: String },
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Logged => "logged",
            DeliveryStatus::Failed { .. } => "failed",
        }
    }
}

/// 验证码投递器
///
/// 投递失败只记录日志，不会让签发失败。
pub struct OtpDispatcher {
    email_sender: Option<Arc<dyn EmailSender>>,
    log_code_on_failure: bool,
}

impl OtpDispatcher {
    pub fn new(email_sender: Option<Arc<dyn EmailSender>>) -> Self {
        Self {
            email_sender,
            log_code_on_failure: false,
        }
    }

    /// 邮件投递失败时把验证码写入日志（仅限开发环境）
    pub fn with_log_code_on_failure(mut self, enabled: bool) -> Self {
        self.log_code_on_failure = enabled;
        self
    }

    pub async fn dispatch(&self, identifier: &Identifier, code: &str, ttl_secs: u64) -> DeliveryStatus {
        match identifier.channel() {
            Channel::Email => self.send_email(identifier, code, ttl_secs).await,
            Channel::Opaque => {
                // 短信通道尚未接入
                info!(identifier = %identifier, code = %code, "OTP send (mobile)");
                DeliveryStatus::Logged
            }
        }
    }

    async fn send_email(&self, identifier: &Identifier, code: &str, ttl_secs: u64) -> DeliveryStatus {
        let Some(sender) = &self.email_sender else {
            return self.failed(identifier, code, "email delivery not configured".to_string());
        };

        let context = serde_json::json!({
            "code": code,
            "expires_in_minutes": ttl_secs.div_ceil(60),
        });

        match sender
            .send_template(identifier.as_str(), OTP_EMAIL_SUBJECT, OTP_EMAIL_TEMPLATE, &context)
            .await
        {
            Ok(()) => {
                info!(identifier = %identifier, "OTP email sent");
                DeliveryStatus::Delivered
            }
            Err(e) => self.failed(identifier, code, e.to_string()),
        }
    }

    fn failed(&self, identifier: &Identifier, code: &str, reason: String) -> DeliveryStatus {
        error!(identifier = %identifier, error = %reason, "Failed to deliver OTP");
        if self.log_code_on_failure {
            warn!(identifier = %identifier, code = %code, "Undelivered OTP");
        }
        DeliveryStatus::Failed { reason }
    }
}
