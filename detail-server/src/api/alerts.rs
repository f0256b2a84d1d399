//! Alert API

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use serde::Serialize;
use shared::models::AlertRecord;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/alerts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).delete(clear_all))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/{id}/read", post(mark_read))
        .route("/{id}", delete(dismiss))
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

/// GET /api/alerts - 全部告警 (最新在前)
pub async fn list(State(state): State<ServerState>) -> Json<ApiResponse<Vec<AlertRecord>>> {
    let mut alerts = state.alerts.list().await;
    alerts.reverse();
    ok(alerts)
}

/// GET /api/alerts/unread-count
pub async fn unread_count(State(state): State<ServerState>) -> Json<ApiResponse<CountResponse>> {
    ok(CountResponse {
        count: state.alerts.unread_count().await,
    })
}

/// POST /api/alerts/{id}/read
pub async fn mark_read(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.alerts.mark_read(&id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// POST /api/alerts/read-all
pub async fn mark_all_read(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<CountResponse>>> {
    let count = state.alerts.mark_all_read().await?;
    Ok(ok(CountResponse { count }))
}

/// DELETE /api/alerts/{id}
pub async fn dismiss(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.alerts.dismiss(&id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// DELETE /api/alerts
pub async fn clear_all(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<()>>> {
    state.alerts.clear_all().await?;
    Ok(Json(ApiResponse::ok()))
}
