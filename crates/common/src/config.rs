//! Configuration management for the application.
//!
//! Settings are loaded from configuration files and environment variables.
//! Every field has a default, so an empty source set yields a usable
//! configuration.
//!
//! ## Example Configuration
//!
//! ```toml
//! [logging.performance]
//! slow_threshold_ms = 1000
//!
//! [logging.request]
//! log_headers = false
//! log_body = false
//!
//! [interception]
//! mode = "advanced"
//! service_layer = false
//!
//! [correlation]
//! user_id_header = "X-User-Id"
//! anonymous_user = "anonymous"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub logging: LoggingConfig,
    pub interception: InterceptionConfig,
    pub correlation: CorrelationConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// CORS allowed origins
    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name attached to startup logs
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable JSON logging format
    #[serde(default)]
    pub json_logging: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Separate file for the performance log sink. When unset, performance
    /// records share the main sink.
    #[serde(default)]
    pub performance_log: Option<PathBuf>,
}

/// Interceptor logging options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub performance: PerformanceConfig,
    pub request: RequestLoggingConfig,
}

/// Performance record options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Calls taking longer than this are reported as slow
    #[serde(default = "default_slow_threshold_ms")]
    pub slow_threshold_ms: u64,
}

/// Request detail logging options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestLoggingConfig {
    /// Include request headers in request details
    pub log_headers: bool,

    /// Include the argument type summary in request details
    pub log_body: bool,
}

/// Which interceptors are attached to controllers and services
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptionConfig {
    /// Controller interceptor variant
    pub mode: InterceptionMode,

    /// Attach debug logging to service-layer calls
    pub service_layer: bool,
}

/// Controller interceptor variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterceptionMode {
    /// Entry/exit/failure logging only
    Basic,
    /// Correlation context, performance records and exception context
    #[default]
    Advanced,
}

/// Correlation context options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Header carrying the caller's user id
    #[serde(default = "default_user_id_header")]
    pub user_id_header: String,

    /// User id recorded when the header is absent
    #[serde(default = "default_anonymous_user")]
    pub anonymous_user: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_service_name() -> String {
    "aop-logging".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_slow_threshold_ms() -> u64 {
    1000
}

fn default_user_id_header() -> String {
    "X-User-Id".to_string()
}

fn default_anonymous_user() -> String {
    "anonymous".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            cors_allowed_origins: default_cors_origins(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            json_logging: false,
            log_level: default_log_level(),
            performance_log: None,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            slow_threshold_ms: default_slow_threshold_ms(),
        }
    }
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            user_id_header: default_user_id_header(),
            anonymous_user: default_anonymous_user(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and configuration files.
    ///
    /// The configuration is loaded in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/{environment}.toml (if exists, where environment is from APP_ENV)
    /// 4. Environment variables (prefixed with APP_)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use aop_logging_common::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load configuration");
    /// println!("Slow threshold: {} ms", config.logging.performance.slow_threshold_ms);
    /// ```
    pub fn load() -> Result<Self> {
        Self::load_with(
            // Example: APP_LOGGING__PERFORMANCE__SLOW_THRESHOLD_MS=250
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }

    /// Load configuration using the given environment source as the final layer.
    pub fn load_with(environment: config::Environment) -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(environment)
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.server.request_timeout_seconds == 0 {
            anyhow::bail!("Request timeout must be greater than 0");
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.telemetry.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log level '{}'. Must be one of: {}",
                self.telemetry.log_level,
                valid_log_levels.join(", ")
            );
        }

        if self.correlation.user_id_header.trim().is_empty() {
            anyhow::bail!("User id header name is required");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    /// Get server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl PerformanceConfig {
    /// Slow-method threshold as a Duration
    pub fn slow_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_threshold_ms)
    }
}

impl RequestLoggingConfig {
    /// Whether any request detail is logged at all
    pub fn is_enabled(&self) -> bool {
        self.log_headers || self.log_body
    }
}
