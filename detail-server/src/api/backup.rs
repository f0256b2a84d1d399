//! Backup API
//!
//! - GET  /api/backup/export  → snapshot JSON as an attachment
//! - POST /api/backup/restore → raw snapshot body, returns the restore report
//! - POST /api/backup/upload  → snapshot pushed to object storage
//! - POST /api/backup/save    → snapshot written under `work_dir/backups`
//!
//! The restore body limit comes from `Config::max_restore_bytes` (0 = none);
//! axum's 2 MB default would reject real snapshots.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;

use crate::backup::{RestoreReport, backup_file_name};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

pub fn router(max_restore_bytes: usize) -> Router<ServerState> {
    let body_limit = match max_restore_bytes {
        0 => DefaultBodyLimit::disable(),
        max => DefaultBodyLimit::max(max),
    };
    Router::new()
        .route("/api/backup/export", get(export))
        .route("/api/backup/restore", post(restore).layer(body_limit))
        .route("/api/backup/upload", post(upload))
        .route("/api/backup/save", post(save))
}

/// GET /api/backup/export
pub async fn export(State(state): State<ServerState>) -> AppResult<impl IntoResponse> {
    let json = state.backup.export_json().await?;
    let disposition = format!("attachment; filename=\"{}\"", backup_file_name());

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        json,
    ))
}

/// POST /api/backup/restore
///
/// Only an unparseable body is an error; partial failures are in the report.
pub async fn restore(
    State(state): State<ServerState>,
    body: String,
) -> AppResult<Json<ApiResponse<RestoreReport>>> {
    let report = state.backup.restore_from_json(&body).await?;
    Ok(ok(report))
}

/// Where a snapshot ended up (object path or local file)
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub path: String,
}

/// POST /api/backup/upload
pub async fn upload(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    let path = state.backup.upload_snapshot().await?;
    Ok(ok(UploadResponse { path }))
}

/// POST /api/backup/save
pub async fn save(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    let path = state
        .backup
        .export_to_file(state.config.backup_dir())
        .await?;
    Ok(ok(UploadResponse {
        path: path.display().to_string(),
    }))
}
