//! Booking API

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use shared::models::{Booking, BookingCreate, BookingUpdate};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/bookings", get(list).post(create))
        .route("/api/bookings/{id}", patch(update).delete(remove))
}

/// GET /api/bookings
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Booking>>>> {
    Ok(ok(state.bookings.get_all().await?))
}

/// POST /api/bookings
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BookingCreate>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let actor = state.actor().await;
    Ok(ok(state.bookings.create(&payload, &actor).await?))
}

/// PATCH /api/bookings/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<BookingUpdate>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let actor = state.actor().await;
    Ok(ok(state.bookings.update(&id, &payload, &actor).await?))
}

/// DELETE /api/bookings/{id}
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.bookings.remove(&id).await?;
    Ok(Json(ApiResponse::ok()))
}
