//! Member Auth Service Library
//!
//! 会员门户的验证码登录服务：
//! - `domain`: 标识、OTP 记录、账号、会话与领域服务
//! - `application`: 命令与处理器
//! - `infrastructure`: 持久化、会话、指标
//! - `api`: HTTP 接口

pub mod api;
pub mod application;
pub mod container;
pub mod domain;
pub mod error;
pub mod infrastructure;
