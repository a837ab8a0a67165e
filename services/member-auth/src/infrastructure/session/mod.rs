//! 会话实现

mod token_session_manager;

pub use token_session_manager::*;
