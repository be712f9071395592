//! Subscriber setup: pretty console output, plus OTLP span export over gRPC
//! when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.

use anyhow::{Context, Result};
use opentelemetry::{
    KeyValue, global, propagation::TextMapCompositePropagator, trace::TracerProvider as _,
};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    propagation::{BaggagePropagator, TraceContextPropagator},
    trace::SdkTracerProvider,
};
use std::{env, sync::OnceLock, time::Duration};
use tracing::{Level, warn};
use tracing_subscriber::{EnvFilter, Registry, filter::Directive, fmt, layer::SubscriberExt};
use ulid::Ulid;

const ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
const PROTOCOL_VAR: &str = "OTEL_EXPORTER_OTLP_PROTOCOL";
const INSTANCE_VAR: &str = "OTEL_SERVICE_INSTANCE_ID";
const EXPORT_TIMEOUT: Duration = Duration::from_secs(3);

// Dependencies that drown out request logs at INFO and below.
const QUIET_TARGETS: [&str; 4] = [
    "hyper=error",
    "tokio=error",
    "sqlx=warn",
    "opentelemetry_sdk=warn",
];

static PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// A bare `host:port` endpoint is taken as https.
fn with_scheme(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}

/// `RUST_LOG` wins over `level`; the quiet targets apply either way.
fn filter(level: Level) -> Result<EnvFilter> {
    let base = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    QUIET_TARGETS.iter().try_fold(base, |filter, target| {
        let directive = target
            .parse::<Directive>()
            .with_context(|| format!("invalid log directive {target}"))?;
        Ok(filter.add_directive(directive))
    })
}

fn resource() -> Resource {
    let instance_id = env::var(INSTANCE_VAR).unwrap_or_else(|_| Ulid::new().to_string());

    Resource::builder_empty()
        .with_attributes([
            KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("service.instance.id", instance_id),
        ])
        .build()
}

fn tracer_provider(endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(with_scheme(endpoint))
        .with_timeout(EXPORT_TIMEOUT)
        .build()
        .context("failed to build OTLP span exporter")?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource())
        .build();

    global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ]));
    global::set_tracer_provider(provider.clone());

    Ok(provider)
}

/// Install the global subscriber. Without a level only errors are logged.
///
/// # Errors
///
/// Returns an error if the exporter cannot be built or a subscriber is
/// already installed.
pub fn init(level: Option<Level>) -> Result<()> {
    let console = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty();

    let export = match env::var(ENDPOINT_VAR) {
        Ok(endpoint) => {
            let provider = tracer_provider(&endpoint)?;
            let tracer = provider.tracer(env!("CARGO_PKG_NAME"));
            let _ = PROVIDER.set(provider);
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        Err(_) => None,
    };

    let subscriber = Registry::default()
        .with(console)
        .with(export)
        .with(filter(level.unwrap_or(Level::ERROR))?);
    tracing::subscriber::set_global_default(subscriber)
        .context("a global tracing subscriber is already installed")?;

    if let Ok(protocol) = env::var(PROTOCOL_VAR)
        && protocol != "grpc"
    {
        warn!(%protocol, "{PROTOCOL_VAR} ignored: spans are exported over grpc");
    }

    Ok(())
}

/// Flush and stop the span exporter, if one was started.
pub fn shutdown_tracer() {
    if let Some(provider) = PROVIDER.get()
        && let Err(err) = provider.shutdown()
    {
        warn!("Failed to shut down tracer provider: {err}");
    }
}
