//! 查询定义

mod profile;

pub use profile::*;
