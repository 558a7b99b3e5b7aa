//! Outbound delivery to a Discord incoming webhook.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{error, info};

use super::types::DiscordMessage;

/// Failure to deliver a message to Discord.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// No destination URL was configured.
    #[error("Discord webhook URL is not configured")]
    MissingUrl,

    /// Discord answered with a non-success status.
    #[error("Discord error: {status} {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (timeout, refused, DNS).
    #[error("Discord request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Shared Discord webhook client.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct DiscordClient {
    client: Client,
    url: Arc<str>,
}

impl DiscordClient {
    /// Create a client posting to `url` with the given request timeout.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ForwardError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ForwardError::Transport)?;

        Ok(Self {
            client,
            url: Arc::from(url),
        })
    }

    /// Post one message. A single attempt is made; nothing is retried.
    pub async fn forward(&self, message: &DiscordMessage) -> Result<(), ForwardError> {
        if self.url.is_empty() {
            error!("discord_forward_no_destination");
            return Err(ForwardError::MissingUrl);
        }

        // The webhook URL carries Discord's secret, so errors are stripped of it.
        let response = self
            .client
            .post(&*self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                if e.is_timeout() {
                    error!(error = %e, "discord_request_timeout");
                } else {
                    error!(error = %e, "discord_request_error");
                }
                ForwardError::Transport(e)
            })?;

        let status = response.status().as_u16();
        if status >= 300 {
            let body = response.text().await.unwrap_or_default();
            error!(
                status_code = status,
                body_length = body.len(),
                "discord_rejected_message"
            );
            return Err(ForwardError::Status { status, body });
        }

        info!(status_code = status, "discord_message_delivered");

        Ok(())
    }
}
