//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::time::Duration;

use crate::neynar::DEFAULT_MAX_COUNT;

/// Upstream page size is a hard limit of the Neynar API.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub neynar: NeynarConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Allowed CORS origin; permissive when unset
    pub allowed_origin: Option<String>,
}

/// Neynar API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NeynarConfig {
    /// API base URL (e.g., "https://api.neynar.com/v2/farcaster")
    pub base_url: String,
    /// API key sent as `x-api-key`; requests fail when absent
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
    /// Records requested per page (capped at 100)
    pub page_size: u32,
    /// Pause between successive page requests
    pub page_delay_ms: u64,
    /// Drop accounts already seen earlier in the same fetch
    pub dedupe_edges: bool,
}

impl NeynarConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

/// Compatibility analysis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Edges fetched per list when the request has no limit (default: 1000)
    pub default_limit: usize,
    /// Largest limit a request may ask for
    pub max_limit: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl LoggingConfig {
    /// Fallback `EnvFilter` directives used when `RUST_LOG` is unset
    pub fn filter_directives(&self) -> String {
        format!("farmix={0},tower_http={0}", self.level)
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (FARMIX__*)
    /// 5. `NEYNAR_API_KEY` when no key was configured otherwise
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("neynar.base_url", "https://api.neynar.com/v2/farcaster")?
            .set_default("neynar.request_timeout_seconds", 30)?
            .set_default("neynar.page_size", 100)?
            .set_default("neynar.page_delay_ms", 100)?
            .set_default("neynar.dedupe_edges", true)?
            .set_default("analysis.default_limit", DEFAULT_MAX_COUNT as i64)?
            .set_default("analysis.max_limit", 5000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("FARMIX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let mut app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        if app_config.neynar.api_key.is_none() {
            app_config.neynar.api_key = std::env::var("NEYNAR_API_KEY").ok();
        }
        app_config.neynar.api_key = app_config
            .neynar
            .api_key
            .take()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        app_config.validate()?;
        Ok(app_config)
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        use crate::error::AppError;

        let base_url = url::Url::parse(&self.neynar.base_url)
            .map_err(|e| AppError::Config(format!("neynar.base_url is invalid: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(AppError::Config(
                "neynar.base_url must use http or https".to_string(),
            ));
        }

        if self.neynar.page_size == 0 || self.neynar.page_size > MAX_PAGE_SIZE {
            return Err(AppError::Config(format!(
                "neynar.page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        if self.neynar.request_timeout_seconds == 0 {
            return Err(AppError::Config(
                "neynar.request_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.analysis.default_limit == 0 || self.analysis.default_limit > self.analysis.max_limit
        {
            return Err(AppError::Config(
                "analysis.default_limit must be between 1 and analysis.max_limit".to_string(),
            ));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(AppError::Config(
                "logging.format must be \"pretty\" or \"json\"".to_string(),
            ));
        }

        if self.neynar.api_key.is_none() {
            tracing::warn!("Neynar API key is not configured; upstream requests will fail");
        }

        Ok(())
    }
}
