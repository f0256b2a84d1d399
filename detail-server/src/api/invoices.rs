//! Invoice API

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use shared::models::{Invoice, InvoiceCreate, InvoiceUpdate};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/invoices", get(list).post(create))
        .route("/api/invoices/{id}", patch(update).delete(remove))
}

/// GET /api/invoices
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Invoice>>>> {
    Ok(ok(state.invoices.get_all().await?))
}

/// POST /api/invoices
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<InvoiceCreate>,
) -> AppResult<Json<ApiResponse<Invoice>>> {
    let actor = state.actor().await;
    Ok(ok(state.invoices.create(&payload, &actor).await?))
}

/// PATCH /api/invoices/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<InvoiceUpdate>,
) -> AppResult<Json<ApiResponse<Invoice>>> {
    let actor = state.actor().await;
    Ok(ok(state.invoices.update(&id, &payload, &actor).await?))
}

/// DELETE /api/invoices/{id}
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.invoices.remove(&id).await?;
    Ok(Json(ApiResponse::ok()))
}
