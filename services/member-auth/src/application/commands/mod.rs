//! 命令定义

mod auth;
mod otp;
mod profile;

pub use auth::*;
pub use otp::*;
pub use profile::*;

use serde::{Deserialize, Serialize};

/// 仅包含提示信息的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResult {
    pub message: String,
}

impl MessageResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
