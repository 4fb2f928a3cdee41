//! Tracing subscriber and OpenTelemetry wiring.
//!
//! Every crate in the workspace emits `tracing` spans and events; this module
//! decides where they go. Events are always written to stdout as JSON. When an
//! OTLP endpoint is configured, spans are additionally exported over gRPC.

use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace::TracerProvider, Resource};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE_NAME: &str = "budmeet-waitlist";

/// Handle that flushes exported spans on shutdown.
#[must_use = "call shutdown() to flush exported spans"]
pub struct Telemetry {
    provider: Option<TracerProvider>,
}

impl Telemetry {
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "Failed to flush OpenTelemetry spans");
            }
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` controls the filter
/// (default `info`).
pub fn init(otlp_endpoint: Option<&str>) -> Result<Telemetry> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let provider = otlp_endpoint.map(tracer_provider).transpose()?;
    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .with(otel_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    if let Some(provider) = &provider {
        global::set_tracer_provider(provider.clone());
    }

    Ok(Telemetry { provider })
}

fn tracer_provider(endpoint: &str) -> Result<TracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .with_context(|| format!("failed to build OTLP exporter for {endpoint}"))?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new([KeyValue::new("service.name", SERVICE_NAME)]))
        .build())
}
