//! Webhook endpoint handlers.
//!
//! The GitLab handler runs the whole pipeline inline:
//! 1. Verify the `X-Gitlab-Token` header
//! 2. Parse the body and map it to a Discord message
//! 3. Forward the message and report the outcome to GitLab

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::discord::DiscordClient;
use crate::gitlab::{build_discord_message, lookup_str};
use crate::web::auth::{log_headers, verify_gitlab_token};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub discord: DiscordClient,
}

impl AppState {
    pub fn new(config: Config, discord: DiscordClient) -> Self {
        Self {
            config: Arc::new(config),
            discord,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// GitLab Webhook
// =============================================================================

/// Webhook response.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookResponse {
    pub fn delivered() -> Self {
        Self {
            ok: true,
            ignored: None,
            error: None,
        }
    }

    pub fn ignored() -> Self {
        Self {
            ok: true,
            ignored: Some(true),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            ignored: None,
            error: Some(error.into()),
        }
    }
}

/// GitLab webhook endpoint.
///
/// The body is taken as raw bytes so malformed JSON yields a 400 with our
/// own response shape, independent of the request's content type.
pub async fn gitlab_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<WebhookResponse>) {
    log_headers(&headers);

    if let Err(e) = verify_gitlab_token(&state.config.gitlab_webhook_token, &headers) {
        warn!(reason = %e, "gitlab_auth_invalid");
        return (StatusCode::UNAUTHORIZED, Json(WebhookResponse::failed(e.to_string())));
    }

    let event: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, body_length = body.len(), "gitlab_payload_invalid");
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookResponse::failed(format!("Invalid JSON body: {e}"))),
            );
        }
    };

    info!(
        object_kind = lookup_str(&event, &["object_kind"]).unwrap_or("<none>"),
        action = lookup_str(&event, &["object_attributes", "action"]).unwrap_or("<none>"),
        body_length = body.len(),
        "gitlab_webhook_received"
    );

    let Some(message) = build_discord_message(&event) else {
        info!("gitlab_event_ignored");
        return (StatusCode::OK, Json(WebhookResponse::ignored()));
    };

    if let Err(e) = state.discord.forward(&message).await {
        error!(error = %e, "discord_forward_failed");
        return (StatusCode::BAD_GATEWAY, Json(WebhookResponse::failed(e.to_string())));
    }

    info!(title = %message.embeds[0].title, "discord_forwarded");

    (StatusCode::OK, Json(WebhookResponse::delivered()))
}
