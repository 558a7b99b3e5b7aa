//! Configuration module for environment variable parsing.
//!
//! All values are read once at startup and handed to the request handlers
//! through [`crate::web::AppState`]; nothing here is mutated afterwards.
//! A `.env` file is honoured, with real environment variables taking precedence.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord incoming-webhook URL that mapped messages are posted to
    pub discord_webhook_url: String,

    /// Expected value of the `X-Gitlab-Token` header. Empty disables auth.
    pub gitlab_webhook_token: SecretString,

    /// Port for the web server to listen on
    pub port: u16,

    /// Timeout for the outbound Discord request in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load `.env` from the working directory or a parent, then read the environment.
    pub fn load() -> Self {
        report_dotenv(dotenvy::dotenv());
        Self::from_env()
    }

    /// Load the given env file, then read the environment.
    ///
    /// A missing or unreadable file is logged and otherwise ignored.
    pub fn from_env_file(path: &Path) -> Self {
        report_dotenv(dotenvy::from_path(path).map(|()| path.to_path_buf()));
        Self::from_env()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            discord_webhook_url: env_trimmed("DISCORD_WEBHOOK_URL"),

            gitlab_webhook_token: SecretString::new(env_trimmed("GITLAB_WEBHOOK_TOKEN")),

            port: parse_or("PORT", 8000),

            request_timeout_ms: parse_or("REQUEST_TIMEOUT_MS", 10_000),
        }
    }

    /// Whether inbound requests must carry a matching token.
    pub fn auth_enabled(&self) -> bool {
        !self.gitlab_webhook_token.expose_secret().is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Emit the degraded-mode warnings. Called once before serving.
    pub fn log_warnings(&self) {
        if let Err(reason) = check_destination(&self.discord_webhook_url) {
            if self.discord_webhook_url.is_empty() {
                warn!("discord_url_missing");
            } else {
                warn!(reason = %reason, "discord_url_invalid");
            }
        }

        if !self.auth_enabled() {
            warn!("auth_disabled");
        }
    }
}

/// Log the outcome of loading an env file.
///
/// Parse errors are reported by line index only; the offending line may hold a secret.
fn report_dotenv(result: Result<PathBuf, dotenvy::Error>) {
    match result {
        Ok(path) => info!(path = %path.display(), "dotenv_loaded"),
        Err(e) if e.not_found() => debug!("dotenv_not_found"),
        Err(dotenvy::Error::LineParse(_, index)) => warn!(index, "dotenv_invalid_line"),
        Err(dotenvy::Error::Io(e)) => warn!(error = %e, "dotenv_unreadable"),
        Err(_) => warn!("dotenv_invalid"),
    }
}

/// Read an environment variable, trimmed, empty when unset.
fn env_trimmed(name: &str) -> String {
    env::var(name)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Parse an environment variable, falling back to `default` when unset or invalid.
fn parse_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    let raw = env_trimmed(name);
    if raw.is_empty() {
        return default;
    }

    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

/// Check that the destination is an absolute http(s) URL.
///
/// The URL itself embeds Discord's webhook secret, so the error never echoes it.
fn check_destination(raw: &str) -> Result<(), String> {
    if raw.is_empty() {
        return Err("not set".to_string());
    }

    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme {other}")),
    }
}
