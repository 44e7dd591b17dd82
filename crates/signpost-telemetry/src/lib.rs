//! Process-wide tracing setup for the signpost binaries.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};
use typed_builder::TypedBuilder;

pub const DEFAULT_SERVICE_NAME: &str = "signpost";
pub const DEFAULT_FILTER: &str = "info,signpost_resolver=debug,signpost_gateway=debug";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to build span exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),
    #[error("a global subscriber is already installed: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
    #[error("a global logger is already installed: {0}")]
    Logger(#[from] tracing_log::log::SetLoggerError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human readable.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct TelemetryConfig {
    #[builder(default = DEFAULT_SERVICE_NAME.to_string(), setter(into))]
    pub service_name: String,
    #[builder(default)]
    pub format: LogFormat,
    /// Used when `RUST_LOG` is unset.
    #[builder(default = DEFAULT_FILTER.to_string(), setter(into))]
    pub default_filter: String,
    /// OTLP/gRPC collector. Span export is off while unset.
    #[builder(default, setter(into))]
    pub otlp_endpoint: Option<String>,
}

/// Flushes exported spans when dropped. Keep it alive for the life of the process.
#[must_use]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to flush spans: {e}");
            }
        }
    }
}

/// Installs the global subscriber and the `log` bridge.
pub fn init(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let filter = env_filter(std::env::var("RUST_LOG").ok(), &config.default_filter)?;

    let fmt_layer = match config.format {
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Json => fmt::layer().json().flatten_event(true).boxed(),
    };

    let provider = config
        .otlp_endpoint
        .as_deref()
        .map(|endpoint| tracer_provider(&config.service_name, endpoint))
        .transpose()?;
    let otel_layer = provider
        .as_ref()
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer(DEFAULT_SERVICE_NAME)));

    let subscriber = tracing_subscriber::registry()
        .with(otel_layer)
        .with(fmt_layer)
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    Ok(TelemetryGuard { provider })
}

fn env_filter(from_env: Option<String>, default: &str) -> Result<EnvFilter, TelemetryError> {
    let directives = from_env
        .filter(|directives| !directives.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    Ok(EnvFilter::try_new(directives)?)
}

fn tracer_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider, TelemetryError> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.to_string())
                .build(),
        )
        .build())
}
