//! ports - 抽象 trait 层
//!
//! 定义基础设施的抽象接口

mod cache;
mod clock;

pub use cache::*;
pub use clock::*;
