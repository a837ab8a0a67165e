//! 验证码登录处理器

use std::sync::Arc;

use async_trait::async_trait;
use portal_errors::AppResult;
use tracing::info;

use crate::application::CommandHandler;
use crate::application::commands::{VerifyOtpCommand, VerifyOtpResult};
use crate::domain::services::OtpService;
use crate::error::OtpError;
use crate::infrastructure::observability::metrics;

/// 验证码登录处理器
pub struct VerifyOtpHandler {
    otp_service: Arc<OtpService>,
    home_page: String,
}

impl VerifyOtpHandler {
    pub fn new(otp_service: Arc<OtpService>, home_page: impl Into<String>) -> Self {
        Self {
            otp_service,
            home_page: home_page.into(),
        }
    }
}

#[async_trait]
impl CommandHandler<VerifyOtpCommand> for VerifyOtpHandler {
    async fn handle(&self, command: VerifyOtpCommand) -> AppResult<VerifyOtpResult> {
        info!("Handling VerifyOtp command");

        let result = self
            .otp_service
            .verify_code(
                &command.email_or_mobile,
                &command.otp,
                command.set_password.as_deref(),
            )
            .await;

        match result {
            Ok(login) => {
                metrics::record_otp_verification("success");
                Ok(VerifyOtpResult {
                    message: "Logged in successfully".to_string(),
                    home_page: self.home_page.clone(),
                    password_set: login.password_set,
                    token: login.session.token,
                    expires_in: login.session.expires_in,
                })
            }
            Err(e) => {
                let outcome = match &e {
                    OtpError::NotRequested => "not_requested",
                    OtpError::InvalidCode => "invalid_code",
                    OtpError::Rejected => "rejected",
                    OtpError::MissingInput(_) | OtpError::InvalidIdentifier => "invalid",
                    OtpError::QuotaExceeded { .. } | OtpError::App(_) => "error",
                };
                metrics::record_otp_verification(outcome);
                Err(e.into())
            }
        }
    }
}
