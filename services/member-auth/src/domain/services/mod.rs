//! 领域服务

mod account_service;
mod identity_resolver;
mod otp_dispatcher;
mod otp_service;
mod otp_store;
mod profile_service;

pub use account_service::*;
pub use identity_resolver::*;
pub use otp_dispatcher::*;
pub use otp_service::*;
pub use otp_store::*;
pub use profile_service::*;
