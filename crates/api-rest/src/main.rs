//! AOP Logging demo server
//!
//! Serves the order API with the logging interceptors attached.

use anyhow::{Context, Result};
use aop_logging_api_rest::create_app;
use aop_logging_common::{init_tracing, AppConfig, InterceptionMode};
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

/// Controller interceptor variant
#[derive(Copy, Clone, Debug, ValueEnum)]
enum CliMode {
    /// Entry/exit/failure logging only
    Basic,
    /// Correlation context, performance records and exception context
    Advanced,
}

impl From<CliMode> for InterceptionMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Basic => InterceptionMode::Basic,
            CliMode::Advanced => InterceptionMode::Advanced,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "aop-logging-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host to bind to (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Slow-method threshold in milliseconds (overrides config)
    #[arg(long)]
    slow_threshold_ms: Option<u64>,

    /// Interceptor variant (overrides config)
    #[arg(long, value_enum)]
    mode: Option<CliMode>,

    /// Attach debug logging to service-layer calls
    #[arg(long)]
    service_layer: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = AppConfig::load()?;

    // Override with CLI arguments
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(threshold) = args.slow_threshold_ms {
        config.logging.performance.slow_threshold_ms = threshold;
    }
    if let Some(mode) = args.mode {
        config.interception.mode = mode.into();
    }
    if args.service_layer {
        config.interception.service_layer = true;
    }
    config.validate()?;

    // Initialize tracing
    init_tracing(&config.telemetry)?;

    let address = config.server_address();
    info!(
        address = %address,
        mode = ?config.interception.mode,
        slow_threshold_ms = config.logging.performance.slow_threshold_ms,
        "Starting {}",
        config.telemetry.service_name
    );

    let app = create_app(config);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Received shutdown signal");
}
