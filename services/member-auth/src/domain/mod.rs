//! 领域层
//!
//! 包含 OTP、账号、会话等领域模型与领域服务

pub mod account;
pub mod identifier;
pub mod member_profile;
pub mod otp;
pub mod password;
pub mod repositories;
pub mod services;
pub mod session;
