//! 发送验证码处理器

use std::sync::Arc;

use async_trait::async_trait;
use portal_errors::AppResult;
use tracing::info;

use crate::application::CommandHandler;
use crate::application::commands::{MessageResult, SendOtpCommand};
use crate::domain::identifier::Identifier;
use crate::domain::services::OtpService;
use crate::error::ErrorCategory;
use crate::infrastructure::observability::metrics;

/// 发送验证码处理器
pub struct SendOtpHandler {
    otp_service: Arc<OtpService>,
}

impl SendOtpHandler {
    pub fn new(otp_service: Arc<OtpService>) -> Self {
        Self { otp_service }
    }
}

#[async_trait]
impl CommandHandler<SendOtpCommand> for SendOtpHandler {
    async fn handle(&self, command: SendOtpCommand) -> AppResult<MessageResult> {
        info!("Handling SendOtp command");

        let channel = Identifier::parse(&command.email_or_mobile)
            .map(|id| id.channel().as_str())
            .unwrap_or("unknown");

        match self.otp_service.request_code(&command.email_or_mobile).await {
            Ok(issued) => {
                metrics::record_otp_request(channel, "issued");
                metrics::record_otp_delivery(channel, issued.delivery.as_str());
                // 不向调用方透露验证码或投递结果
                Ok(MessageResult::new("OTP sent successfully"))
            }
            Err(e) => {
                let outcome = match e.category() {
                    ErrorCategory::Validation => "invalid",
                    ErrorCategory::Quota => "quota_exceeded",
                    _ => "error",
                };
                metrics::record_otp_request(channel, outcome);
                Err(e.into())
            }
        }
    }
}
