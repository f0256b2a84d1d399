//! Contact Message API
//!
//! POST is the public contact form; listing and deletion are for the admin.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use shared::models::{ContactMessage, ContactMessageCreate};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/contact-messages", get(list).post(create))
        .route("/api/contact-messages/{id}", delete(remove))
}

/// GET /api/contact-messages
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<ContactMessage>>>> {
    Ok(ok(state.contact_messages.get_all().await?))
}

/// POST /api/contact-messages
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ContactMessageCreate>,
) -> AppResult<Json<ApiResponse<ContactMessage>>> {
    Ok(ok(state.contact_messages.create(&payload).await?))
}

/// DELETE /api/contact-messages/{id}
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.contact_messages.remove(&id).await?;
    Ok(Json(ApiResponse::ok()))
}
