// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Mail Rate Limiter Service
//!
//! Serves `POST /api/mail` for the site's contact form. Each caller may
//! submit a limited number of messages per window; see the library docs
//! for how callers are identified.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! honored):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_REQUESTS`: Requests per identity per window (default: 5)
//! - `RATE_LIMIT_WINDOW_MS`: Window length in milliseconds (default: 3600000)
//! - `RATE_LIMIT_MAX_IDENTITIES`: Identities tracked at once (default: 100)
//! - `MAIL_WEBHOOK_URL`: Relay receiving submissions as JSON (default: log only)
//! - `MAIL_TIMEOUT_SECS`: Relay request timeout (default: 10)
//! - `METRICS_ENABLED`: Expose Prometheus metrics (default: true)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mail_rate_limiter::{
    clock::{Clock, SystemClock},
    config::Config,
    handlers::{router, AppState},
    mailer::{LogMailer, Mailer, WebhookMailer},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        requests_per_window = config.rate_limit.requests_per_window,
        window_ms = config.rate_limit.window_ms,
        max_tracked_identities = config.rate_limit.max_tracked_identities,
        "Starting contact mail rate limiter"
    );

    let mailer: Arc<dyn Mailer> = match &config.mail.webhook_url {
        Some(url) => {
            let mailer = WebhookMailer::new(&config.mail, url)?;
            info!(endpoint = %mailer.endpoint(), "Relaying mail to webhook");
            Arc::new(mailer)
        }
        None => {
            warn!("MAIL_WEBHOOK_URL not set, submissions will only be logged");
            Arc::new(LogMailer)
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let state = Arc::new(AppState::new(config.clone(), clock, mailer)?);

    // Spawn cleanup task
    let cleanup_state = state.clone();
    let cleanup_every = config.rate_limit.cleanup_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_every);
        loop {
            interval.tick().await;
            cleanup_state.limiter.cleanup();
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
