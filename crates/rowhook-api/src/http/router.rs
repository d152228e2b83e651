//! Axum router for the webhook receiver.
//!
//! Routes:
//! - `POST /webhooks/{trigger}`: deliveries from the table service
//! - `GET /health`: liveness

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::WebhookState;

/// Build the receiver router with tracing middleware.
pub fn build_router(state: WebhookState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/webhooks/{trigger}", post(handlers::webhook::receive_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
