//! Telemetry and observability setup.
//!
//! Two log sinks are configured: the general application sink and the
//! performance sink. Performance records are emitted on the
//! [`PERFORMANCE_TARGET`] target; when a dedicated file is configured they
//! are written there and excluded from the application sink.

use crate::config::TelemetryConfig;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Tracing target of the performance log sink.
pub const PERFORMANCE_TARGET: &str = "performance";

/// Initialize tracing from the telemetry configuration.
///
/// `RUST_LOG` takes precedence over the configured log level.
///
/// # Examples
///
/// ```no_run
/// use aop_logging_common::{config::TelemetryConfig, telemetry::init_tracing};
///
/// init_tracing(&TelemetryConfig::default()).expect("Failed to initialize tracing");
/// ```
pub fn init_tracing(config: &TelemetryConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = Registry::default().with(env_filter);

    match &config.performance_log {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open performance log {}", path.display()))?;

            let performance = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_filter(filter_fn(|metadata| metadata.target() == PERFORMANCE_TARGET));

            registry
                .with(
                    app_layer(config.json_logging)
                        .with_filter(filter_fn(|metadata| metadata.target() != PERFORMANCE_TARGET)),
                )
                .with(performance)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        None => {
            registry
                .with(app_layer(config.json_logging))
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
    }

    Ok(())
}

fn app_layer<S>(json_format: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if json_format {
        json_layer().boxed()
    } else {
        pretty_layer().boxed()
    }
}

/// Create a JSON logging layer
fn json_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(true)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
}

/// Create a pretty-formatted logging layer
fn pretty_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .pretty()
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(true)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
}
