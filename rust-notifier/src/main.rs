//! MR Notifier web server.
//!
//! This binary:
//! - Receives GitLab merge-request webhooks
//! - Verifies the `X-Gitlab-Token` header
//! - Posts a Discord embed for each relevant event and reports the outcome

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mrnotify::{router, AppState, Config, DiscordClient};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!(version = env!("CARGO_PKG_VERSION"), "notifier_starting");

    let config = Config::load();
    info!(
        port = config.port,
        discord_url_configured = !config.discord_webhook_url.is_empty(),
        auth_enabled = config.auth_enabled(),
        request_timeout_ms = config.request_timeout_ms,
        "config_loaded"
    );
    config.log_warnings();

    let discord = DiscordClient::new(&config.discord_webhook_url, config.request_timeout())
        .context("Failed to create Discord HTTP client")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState::new(config, discord));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!(address = %addr, "notifier_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("notifier_stopped");

    Ok(())
}

/// Structured JSON logs, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();
}

/// Resolve on SIGINT or SIGTERM. A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, signal = "SIGINT", "signal_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, signal = "SIGTERM", "signal_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };

    info!(signal = received, "notifier_draining");
}
