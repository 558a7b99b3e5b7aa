//! GitLab webhook token verification.
//!
//! GitLab sends the secret configured on the hook verbatim in the
//! `X-Gitlab-Token` header. Reference: https://docs.gitlab.com/ee/user/project/integrations/webhooks.html#validate-payloads-by-using-a-secret-token

use axum::http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use tracing::{debug, enabled, Level};

/// Header carrying the webhook secret. `HeaderMap` lookups ignore case.
pub const GITLAB_TOKEN_HEADER: &str = "x-gitlab-token";

/// Marker written in place of secret header values.
const REDACTED: &str = "[redacted]";

/// Why a request failed authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing X-Gitlab-Token")]
    Missing,
    #[error("Invalid X-Gitlab-Token")]
    Mismatch,
}

/// Verify the request token against the expected one.
///
/// An empty `expected` token disables verification entirely.
pub fn verify_gitlab_token(expected: &SecretString, headers: &HeaderMap) -> Result<(), AuthError> {
    let expected = expected.expose_secret();
    if expected.is_empty() {
        return Ok(());
    }

    let provided = headers
        .get(GITLAB_TOKEN_HEADER)
        .ok_or(AuthError::Missing)?;

    if constant_time_compare(provided.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(AuthError::Mismatch)
    }
}

/// Constant-time comparison of two secrets.
///
/// Both sides are hashed first so the comparison runs over fixed-size digests
/// and neither the content nor the length of the expected value leaks.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    let a = Sha256::digest(a);
    let b = Sha256::digest(b);

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

fn is_sensitive_header(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    ["token", "secret", "authorization", "cookie"]
        .iter()
        .any(|needle| name.contains(needle))
}

/// Header name/value pairs with secret-bearing values replaced.
pub fn redacted_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if is_sensitive_header(name.as_str()) {
                REDACTED.to_string()
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            (name.as_str().to_string(), value)
        })
        .collect()
}

/// Log the request headers at debug level, secrets redacted.
pub fn log_headers(headers: &HeaderMap) {
    if enabled!(Level::DEBUG) {
        debug!(headers = ?redacted_headers(headers), "gitlab_webhook_headers");
    }
}
