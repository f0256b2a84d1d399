//! 工具模块 - 日志与错误类型
//!
//! - [`AppError`] / [`ApiResponse`] - 统一错误 (from shared::error)
//! - [`logger`] - tracing 初始化

pub mod error;
pub mod logger;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use error::ok;
