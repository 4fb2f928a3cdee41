//! BudMeet waitlist entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load configuration** — read [`config::AppConfig`] from the environment.
//! 2. **Wire observability** — configure `tracing-subscriber` with a JSON layer
//!    and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an OpenTelemetry OTLP
//!    exporter. All `tracing` spans and events emitted by every crate in the
//!    workspace flow through this layer.
//! 3. **Construct infrastructure** — create the `ResendMailer` and the
//!    rate limiter, and inject them into the `NotificationDispatcher`.
//! 4. **Serve** — run the HTTP listener until shutdown is requested.

mod config;
mod observability;

use std::sync::Arc;

use anyhow::{Context, Result};
use intake::{FixedWindowLimiter, LimiterPolicy, NotificationDispatcher, NotificationRouting};
use listener::ListenerConfig;
use mailer::{ResendMailer, ResendSettings};
use tracing::{error, info, warn};

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    let telemetry = observability::init(config.otlp_endpoint.as_deref())?;

    let result = run(config).await;
    if let Err(e) = &result {
        error!(error = format!("{e:#}"), "Waitlist service stopped with an error");
    }

    telemetry.shutdown();
    result
}

async fn run(config: AppConfig) -> Result<()> {
    info!(config = ?config, "Starting waitlist service");

    let missing = config.missing_delivery_settings();
    if !missing.is_empty() {
        warn!(
            missing = missing.join(","),
            "Delivery settings absent; submissions will fail until they are set"
        );
    }

    let mailer = ResendMailer::new(ResendSettings {
        api_key: config.resend_api_key.clone(),
        base_url: config.resend_base_url.clone(),
    })
    .context("failed to construct Resend client")?;

    let policy = LimiterPolicy::default();
    info!(
        max_requests = policy.max_requests,
        window_ms = policy.window.as_millis() as u64,
        "Rate limiter configured"
    );

    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::new(FixedWindowLimiter::new(policy)),
        Arc::new(mailer),
        NotificationRouting {
            to: config.notify_to.clone(),
            from: config.notify_from.clone(),
        },
    ));

    listener::serve(
        ListenerConfig {
            addr: config.listen_addr(),
            sweep_interval: config.sweep_interval,
        },
        dispatcher,
    )
    .await
    .context("listener failed")
}
