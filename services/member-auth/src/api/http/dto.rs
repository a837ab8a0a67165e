//! 请求与响应体

use chrono::NaiveDate;
use portal_errors::AppError;
use serde::{Deserialize, Serialize};

use crate::application::commands::{LoginWithPasswordCommand, SendOtpCommand, VerifyOtpCommand};
use crate::domain::member_profile::ProfileChanges;

/// 缺失字段按空字符串处理，由业务层给出校验错误
#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    #[serde(default)]
    pub email_or_mobile: String,
}

impl From<SendOtpRequest> for SendOtpCommand {
    fn from(req: SendOtpRequest) -> Self {
        Self {
            email_or_mobile: req.email_or_mobile,
        }
    }
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email_or_mobile: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub set_password: Option<String>,
}

impl From<VerifyOtpRequest> for VerifyOtpCommand {
    fn from(req: VerifyOtpRequest) -> Self {
        Self {
            email_or_mobile: req.email_or_mobile,
            otp: req.otp,
            set_password: req.set_password,
        }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

impl From<LoginRequest> for LoginWithPasswordCommand {
    fn from(req: LoginRequest) -> Self {
        Self {
            identifier: req.identifier,
            password: req.password,
        }
    }
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub new_password: String,
}

/// 未提交的字段保持不变，空字符串清空该字段
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveProfileRequest {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub email_id: Option<String>,
    pub mobile_no: Option<String>,
    /// `YYYY-MM-DD`
    pub date_of_birth: Option<String>,
}

impl TryFrom<SaveProfileRequest> for ProfileChanges {
    type Error = AppError;

    fn try_from(req: SaveProfileRequest) -> Result<Self, Self::Error> {
        let date_of_birth = match req.date_of_birth.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                AppError::validation(format!("Invalid date_of_birth {raw:?}, expected YYYY-MM-DD"))
            })?),
        };
        let trimmed = |value: Option<String>| value.map(|v| v.trim().to_string());

        Ok(Self {
            first_name: trimmed(req.first_name),
            middle_name: trimmed(req.middle_name),
            last_name: trimmed(req.last_name),
            gender: trimmed(req.gender),
            email_id: trimmed(req.email_id),
            mobile_no: trimmed(req.mobile_no),
            date_of_birth,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
