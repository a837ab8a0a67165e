//! 命令与查询处理器

mod change_password_handler;
mod logout_handler;
mod password_login_handler;
mod profile_handler;
mod send_otp_handler;
mod verify_otp_handler;

pub use change_password_handler::*;
pub use logout_handler::*;
pub use password_login_handler::*;
pub use profile_handler::*;
pub use send_otp_handler::*;
pub use verify_otp_handler::*;
