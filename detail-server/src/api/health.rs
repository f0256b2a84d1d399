//! 健康检查
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "backend": "reachable", "unread_alerts": 3 }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::ApiResponse;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    /// reachable | signed_out | unreachable
    backend: &'static str,
    unread_alerts: usize,
}

/// GET /api/health
pub async fn health(State(state): State<ServerState>) -> Json<ApiResponse<HealthResponse>> {
    let backend = match state.remote.current_user().await {
        Ok(Some(_)) => "reachable",
        Ok(None) => "signed_out",
        Err(e) => {
            tracing::warn!(error = %e, "Backend health probe failed");
            "unreachable"
        }
    };

    Json(ApiResponse::success(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        backend,
        unread_alerts: state.alerts.unread_count().await,
    }))
}
