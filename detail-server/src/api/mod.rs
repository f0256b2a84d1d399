//! API 路由模块
//!
//! | 模块 | 路径 |
//! |------|------|
//! | [`health`] | /api/health |
//! | [`backup`] | /api/backup/* |
//! | [`alerts`] | /api/alerts/* |
//! | [`customers`] | /api/customers |
//! | [`bookings`] | /api/bookings |
//! | [`invoices`] | /api/invoices |
//! | [`inventory`] | /api/inventory |
//! | [`expenses`] | /api/expenses |
//! | [`contact_messages`] | /api/contact-messages |

pub mod alerts;
pub mod backup;
pub mod bookings;
pub mod contact_messages;
pub mod customers;
pub mod expenses;
pub mod health;
pub mod inventory;
pub mod invoices;

use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::{Config, ServerState};

pub use crate::utils::{ApiResponse, AppResult};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());
    response
}

/// Build the Axum router (without state)
pub fn build_router(config: &Config) -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(backup::router(config.max_restore_bytes))
        .merge(alerts::router())
        .merge(customers::router())
        .merge(bookings::router())
        .merge(invoices::router())
        .merge(inventory::router())
        .merge(expenses::router())
        .merge(contact_messages::router())
}

/// Router with state and tower middleware applied
pub fn build_app(state: ServerState) -> Router {
    build_router(&state.config).with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(middleware::from_fn(log_request)),
    )
}
