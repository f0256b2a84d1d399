//! Inventory API

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use shared::models::{InventoryItem, InventoryItemCreate, InventoryItemUpdate};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/inventory", get(list).post(create))
        .route("/api/inventory/{id}", patch(update).delete(remove))
}

/// GET /api/inventory
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<InventoryItem>>>> {
    Ok(ok(state.inventory.get_all().await?))
}

/// POST /api/inventory
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<InventoryItemCreate>,
) -> AppResult<Json<ApiResponse<InventoryItem>>> {
    let actor = state.actor().await;
    Ok(ok(state.inventory.create(&payload, &actor).await?))
}

/// PATCH /api/inventory/{id} - 低于补货线时产生告警
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<InventoryItemUpdate>,
) -> AppResult<Json<ApiResponse<InventoryItem>>> {
    let actor = state.actor().await;
    Ok(ok(state.inventory.update(&id, &payload, &actor).await?))
}

/// DELETE /api/inventory/{id}
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.inventory.remove(&id).await?;
    Ok(Json(ApiResponse::ok()))
}
