//! Web server module for handling inbound webhooks.
//!
//! This module provides:
//! - `POST /gitlab/webhook`: GitLab merge-request hook, forwarded to Discord
//! - `GET /health`: liveness probe

pub mod auth;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use auth::{redacted_headers, verify_gitlab_token, AuthError, GITLAB_TOKEN_HEADER};
pub use handlers::{gitlab_webhook, health, AppState, HealthResponse, WebhookResponse};

/// Path GitLab is configured to deliver hooks to.
pub const WEBHOOK_PATH: &str = "/gitlab/webhook";

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(WEBHOOK_PATH, post(gitlab_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
