//! Expense API

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use shared::models::{Expense, ExpenseCreate, ExpenseUpdate};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/expenses", get(list).post(create))
        .route("/api/expenses/{id}", patch(update).delete(remove))
}

/// GET /api/expenses
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Expense>>>> {
    Ok(ok(state.expenses.get_all().await?))
}

/// POST /api/expenses
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseCreate>,
) -> AppResult<Json<ApiResponse<Expense>>> {
    let actor = state.actor().await;
    Ok(ok(state.expenses.create(&payload, &actor).await?))
}

/// PATCH /api/expenses/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ExpenseUpdate>,
) -> AppResult<Json<ApiResponse<Expense>>> {
    Ok(ok(state.expenses.update(&id, &payload).await?))
}

/// DELETE /api/expenses/{id}
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.expenses.remove(&id).await?;
    Ok(Json(ApiResponse::ok()))
}
