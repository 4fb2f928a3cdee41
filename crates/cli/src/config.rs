//! Process configuration, read once from the environment at start-up.
//!
//! Delivery settings (`RESEND_API_KEY`, `NOTIFY_TO`, `NOTIFY_FROM`) are
//! optional here: the server starts without them and each submission that
//! reaches the send step fails with a 500 until they are provided. Malformed
//! numeric settings are start-up errors.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use intake::{Mailbox, NOTIFY_FROM_KEY, NOTIFY_TO_KEY};
use mailer::{API_KEY_VAR, DEFAULT_BASE_URL};

pub const PORT_VAR: &str = "PORT";
pub const BASE_URL_VAR: &str = "RESEND_BASE_URL";
pub const SWEEP_VAR: &str = "LIMITER_SWEEP_SECS";
pub const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SWEEP_SECS: u64 = 300;

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub resend_api_key: Option<String>,
    pub resend_base_url: String,
    pub notify_to: Option<Mailbox>,
    pub notify_from: Option<Mailbox>,
    /// `None` when sweeping is disabled (`LIMITER_SWEEP_SECS=0`).
    pub sweep_interval: Option<Duration>,
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let sweep_secs: u64 = parse_or(get(SWEEP_VAR), SWEEP_VAR, DEFAULT_SWEEP_SECS)?;

        Ok(Self {
            port: parse_or(get(PORT_VAR), PORT_VAR, DEFAULT_PORT)?,
            resend_api_key: get(API_KEY_VAR),
            resend_base_url: get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            notify_to: get(NOTIFY_TO_KEY).and_then(Mailbox::new),
            notify_from: get(NOTIFY_FROM_KEY).and_then(Mailbox::new),
            sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            otlp_endpoint: get(OTLP_ENDPOINT_VAR),
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Names of delivery settings that are not configured.
    pub fn missing_delivery_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.resend_api_key.is_none() {
            missing.push(API_KEY_VAR);
        }
        if self.notify_to.is_none() {
            missing.push(NOTIFY_TO_KEY);
        }
        if self.notify_from.is_none() {
            missing.push(NOTIFY_FROM_KEY);
        }
        missing
    }
}

// The API key never reaches logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("resend_api_key", &self.resend_api_key.as_ref().map(|_| "<redacted>"))
            .field("resend_base_url", &self.resend_base_url)
            .field("notify_to", &self.notify_to)
            .field("notify_from", &self.notify_from)
            .field("sweep_interval", &self.sweep_interval)
            .field("otlp_endpoint", &self.otlp_endpoint)
            .finish()
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid {key} value {raw:?}")),
        None => Ok(default),
    }
}
