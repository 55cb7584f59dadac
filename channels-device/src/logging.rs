//! Logging setup for processes hosting the Channels adapter
//!
//! The library itself only emits `tracing` events. Binaries pick an output
//! mode here once at startup.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber; events are dropped
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose output with thread ids and source locations
    Debug,
}

impl LoggingMode {
    /// Parse a `CHANNELS_LOG_MODE` value. Unknown values fall back to `Silent`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => LoggingMode::Development,
            "debug" => LoggingMode::Debug,
            _ => LoggingMode::Silent,
        }
    }
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid log filter {value:?}: {reason}")]
    InvalidFilter { value: String, reason: String },
}

/// Install a global subscriber for `mode`.
///
/// # Environment Variables
///
/// - `CHANNELS_LOG_LEVEL`: filter directive, e.g. `debug` or `channels_device=trace`
/// - `RUST_LOG`: used when `CHANNELS_LOG_LEVEL` is unset
///
/// ```rust,ignore
/// channels_device::logging::init_logging(LoggingMode::Development)?;
/// ```
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter("info")?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter("debug")?;

            Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initialize logging from `CHANNELS_LOG_MODE` (`silent`, `development`, `debug`).
///
/// Defaults to silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = std::env::var("CHANNELS_LOG_MODE")
        .map(|name| LoggingMode::from_name(&name))
        .unwrap_or(LoggingMode::Silent);

    init_logging(mode)
}

fn create_env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = std::env::var("CHANNELS_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());

    EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter {
        value: directive,
        reason: e.to_string(),
    })
}

/// Whether a global subscriber is already installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }

    #[test]
    fn test_mode_from_name() {
        assert_eq!(LoggingMode::from_name("development"), LoggingMode::Development);
        assert_eq!(LoggingMode::from_name(" DEBUG "), LoggingMode::Debug);
        assert_eq!(LoggingMode::from_name("loud"), LoggingMode::Silent);
    }

    #[test]
    fn test_default_filter_is_valid() {
        assert!(create_env_filter("info").is_ok());
    }
}
