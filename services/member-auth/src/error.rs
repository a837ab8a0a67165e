//! 服务错误定义

use portal_errors::AppError;
use thiserror::Error;

/// 错误类别，决定对调用方的呈现方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 输入缺失或格式错误，可由用户修正
    Validation,
    /// 请求过于频繁，附带重试提示
    Quota,
    /// 验证码错误或不存在
    Authentication,
    /// 基础设施故障
    Internal,
}

/// OTP 流程错误
#[derive(Debug, Error)]
pub enum OtpError {
    #[error("{0}")]
    MissingInput(&'static str),

    #[error("Invalid Email Address")]
    InvalidIdentifier,

    #[error("Too many OTP requests. Please try again in {retry_after_secs} seconds.")]
    QuotaExceeded { retry_after_secs: u64 },

    #[error("OTP expired or not requested. Please request a new one.")]
    NotRequested,

    #[error("Invalid OTP")]
    InvalidCode,

    /// `NotRequested` 与 `InvalidCode` 合并后的统一错误
    #[error("Invalid or expired OTP")]
    Rejected,

    #[error(transparent)]
    App(#[from] AppError),
}

impl OtpError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OtpError::MissingInput(_) | OtpError::InvalidIdentifier => ErrorCategory::Validation,
            OtpError::QuotaExceeded { .. } => ErrorCategory::Quota,
            OtpError::NotRequested | OtpError::InvalidCode | OtpError::Rejected => {
                ErrorCategory::Authentication
            }
            OtpError::App(e) => match e.status_code() {
                400 => ErrorCategory::Validation,
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::Quota,
                _ => ErrorCategory::Internal,
            },
        }
    }

    /// 不区分“未请求”和“验证码错误”
    pub fn into_uniform(self) -> Self {
        match self {
            OtpError::NotRequested | OtpError::InvalidCode => OtpError::Rejected,
            other => other,
        }
    }
}

impl From<OtpError> for AppError {
    fn from(err: OtpError) -> Self {
        let message = err.to_string();
        match err {
            OtpError::QuotaExceeded { retry_after_secs } => {
                AppError::resource_exhausted_retry_after(message, retry_after_secs)
            }
            OtpError::MissingInput(_) | OtpError::InvalidIdentifier => AppError::validation(message),
            OtpError::NotRequested | OtpError::InvalidCode | OtpError::Rejected => {
                AppError::unauthenticated(message)
            }
            OtpError::App(e) => e,
        }
    }
}
