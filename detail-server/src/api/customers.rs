//! Customer API

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/customers", get(list).post(create))
        .route("/api/customers/{id}", patch(update).delete(remove))
}

/// GET /api/customers
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Customer>>>> {
    Ok(ok(state.customers.get_all().await?))
}

/// POST /api/customers
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerCreate>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let actor = state.actor().await;
    Ok(ok(state.customers.create(&payload, &actor).await?))
}

/// PATCH /api/customers/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CustomerUpdate>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    Ok(ok(state.customers.update(&id, &payload).await?))
}

/// DELETE /api/customers/{id}
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.customers.remove(&id).await?;
    Ok(Json(ApiResponse::ok()))
}
