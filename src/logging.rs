//! Logging setup.
//!
//! Installs a `tracing` subscriber writing to stderr. The filter comes from
//! `AGENTFORM_LOG` when set, otherwise from the configured level.

use crate::error::{AgentformError, Result};
use std::str::FromStr;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a full `EnvFilter` directive string.
pub const LOG_ENV: &str = "AGENTFORM_LOG";

pub const DEFAULT_LEVEL: &str = "warn";

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = AgentformError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(AgentformError::UserError(format!(
                "invalid log format '{}' (expected text or json)",
                other
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Build from optional CLI values, validating both.
    pub fn from_args(level: Option<&str>, format: Option<&str>) -> Result<Self> {
        let level = match level {
            Some(level) => {
                let level = level.to_ascii_lowercase();
                if !LEVELS.contains(&level.as_str()) {
                    return Err(AgentformError::UserError(format!(
                        "invalid log level '{}' (expected one of: {})",
                        level,
                        LEVELS.join(", ")
                    )));
                }
                level
            }
            None => DEFAULT_LEVEL.to_string(),
        };
        let format = format.map(LogFormat::from_str).transpose()?.unwrap_or_default();
        Ok(Self { level, format })
    }
}

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    if std::env::var_os(LOG_ENV).is_some_and(|v| !v.is_empty()) {
        return Err(AgentformError::UserError(format!(
            "{} holds an invalid filter directive",
            LOG_ENV
        )));
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| AgentformError::UserError(format!("invalid log level: {}", e)))
}

/// Install the global subscriber. Calling it twice is an error.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_env_filter(config)?;
    let base_subscriber = Registry::default().with(filter);

    let installed = match config.format {
        LogFormat::Json => base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => base_subscriber
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    installed.map_err(|e| AgentformError::UserError(format!("failed to install logger: {}", e)))
}
