//! Shared types for the detailing back-office
//!
//! Common types used by detail-server and its clients: the unified error
//! system, table/snapshot/alert/audit models, event types and utilities.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use message::{StorageEvent, UiEvent, UiEventKind};
