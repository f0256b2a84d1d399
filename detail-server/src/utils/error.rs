//! 统一错误处理
//!
//! Re-exports the shared error system and adds handler shorthands.
//!
//! ```ignore
//! async fn handler() -> AppResult<Json<ApiResponse<Vec<AlertRecord>>>> {
//!     Ok(ok(alerts.list().await))
//! }
//! ```

use axum::Json;
use serde::Serialize;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// 成功响应
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

