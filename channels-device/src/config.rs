//! Device identity and adapter tuning

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use channels_client::DEFAULT_PORT;

/// Default interval between status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Identity of one Channels app instance.
///
/// Created by setup and persisted by the host's config store. Read-only once
/// built; the only way to change it is to build a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Stable key derived from the address, e.g. `192_168_1_5`
    identifier: String,
    /// Display name
    name: String,
    /// Host name or IP address of the device running the app
    address: String,
    /// Control API port
    #[serde(default = "default_port")]
    port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl DeviceConfig {
    /// Config for `address` on the default port, identifier derived from the address
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            identifier: Self::identifier_for(&address),
            name: name.into(),
            address,
            port: DEFAULT_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Identifier used for a device at `address`: dots become underscores
    pub fn identifier_for(address: &str) -> String {
        address.replace('.', "_")
    }
}

/// Timing knobs for a [`crate::DeviceAdapter`] and its poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Time between two poll ticks
    /// Default: 5 seconds
    pub poll_interval: Duration,

    /// Total budget for each HTTP request
    /// Default: 5 seconds
    pub request_timeout: Duration,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: channels_client::DEFAULT_TIMEOUT,
        }
    }
}

impl AdapterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `CHANNELS_POLL_INTERVAL_SECS` and
    /// `CHANNELS_REQUEST_TIMEOUT_SECS` when they hold a positive integer.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(interval) = env_seconds("CHANNELS_POLL_INTERVAL_SECS") {
            config.poll_interval = interval;
        }
        if let Some(timeout) = env_seconds("CHANNELS_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = timeout;
        }
        config
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Whether one request can finish before the next tick is due
    pub fn is_consistent(&self) -> bool {
        self.request_timeout <= self.poll_interval
    }
}

fn env_seconds(key: &str) -> Option<Duration> {
    let raw = std::env::var(key).ok()?;
    parse_seconds(&raw).or_else(|| {
        tracing::warn!("Ignoring {}={:?}: expected a positive number of seconds", key, raw);
        None
    })
}

fn parse_seconds(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_derivation() {
        let config = DeviceConfig::new("Living Room", "192.168.1.5");
        assert_eq!(config.identifier(), "192_168_1_5");
        assert_eq!(config.port(), 57000);

        assert_eq!(DeviceConfig::identifier_for("appletv.local"), "appletv_local");
    }

    #[test]
    fn test_config_serde_defaults_port() {
        let config: DeviceConfig = serde_json::from_value(json!({
            "identifier": "10_0_0_9",
            "name": "Den",
            "address": "10.0.0.9"
        }))
        .unwrap();
        assert_eq!(config.port(), DEFAULT_PORT);

        let value = serde_json::to_value(config.with_port(57100)).unwrap();
        assert_eq!(value["port"], json!(57100));
    }

    #[test]
    fn test_config_serialized_shape() {
        let config = DeviceConfig::new("Den", "10.0.0.9");
        assert_eq!(config.name(), "Den");
        assert_eq!(config.address(), "10.0.0.9");

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({
                "identifier": "10_0_0_9",
                "name": "Den",
                "address": "10.0.0.9",
                "port": 57000
            })
        );
        let restored: DeviceConfig = serde_json::from_value(value).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_adapter_config_defaults() {
        let config = AdapterConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.is_consistent());

        let config = config.with_request_timeout(Duration::from_secs(10));
        assert!(!config.is_consistent());
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_seconds(" 3 "), Some(Duration::from_secs(3)));
        assert_eq!(parse_seconds("0"), None);
        assert_eq!(parse_seconds("fast"), None);
    }
}
