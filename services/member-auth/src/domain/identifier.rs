//! Identifier 值对象
//!
//! 调用方提交的邮箱或手机号等标识

use std::fmt;

use crate::error::OtpError;

/// 标识类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// 邮箱，走模板邮件投递
    Email,
    /// 非邮箱（手机号等），暂无真实投递通道
    Opaque,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Opaque => "opaque",
        }
    }
}

/// 已校验的标识
///
/// 原样保留调用方提交的字符串，作为缓存键与账号 ID 使用。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    value: String,
    channel: Channel,
}

impl Identifier {
    /// 解析标识：不能为空；包含 "@" 时必须是合法邮箱
    pub fn parse(raw: &str) -> Result<Self, OtpError> {
        if raw.trim().is_empty() {
            return Err(OtpError::MissingInput("Email or Mobile Number is required"));
        }

        let channel = if raw.contains('@') {
            if !email_address::EmailAddress::is_valid(raw) {
                return Err(OtpError::InvalidIdentifier);
            }
            Channel::Email
        } else {
            Channel::Opaque
        };

        Ok(Self {
            value: raw.to_string(),
            channel,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn is_email(&self) -> bool {
        self.channel == Channel::Email
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
