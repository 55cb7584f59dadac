//! Validation of a new device before it is handed to the config store
//!
//! The interactive form lives in the host; this module only checks the
//! entered values against a live app and derives the [`DeviceConfig`].

use std::time::Duration;

use channels_client::ChannelsClient;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::config::{DeviceConfig, DEFAULT_PORT};

/// Values entered by the user, or found by discovery
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetupRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: String,
    /// Always the app's fixed port outside of tests
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl SetupRequest {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            port: DEFAULT_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    /// Nothing usable was entered; the host should show the form again
    #[error("no address provided")]
    MissingAddress,

    #[error("Channels app at {address} is offline or unreachable")]
    ConnectionRefused { address: String },
}

/// Check that a Channels app answers at the requested address.
///
/// Succeeds for any reachable app, whatever its playback status.
pub async fn query_device(
    request: &SetupRequest,
    timeout: Duration,
) -> Result<DeviceConfig, SetupError> {
    let address = request.address.trim();
    if address.is_empty() {
        warn!("No address provided, re-displaying form");
        return Err(SetupError::MissingAddress);
    }

    let name = match request.name.trim() {
        "" => format!("Channels ({})", address),
        name => name.to_string(),
    };

    debug!("Attempting to connect to Channels app at {}", address);
    let client = ChannelsClient::with_timeout(address, request.port, timeout);
    let response = client.status().await;

    if response.is_offline() {
        error!("Channels app at {} is offline or unreachable", address);
        return Err(SetupError::ConnectionRefused {
            address: address.to_string(),
        });
    }

    info!(
        "Successfully connected to Channels app at {} (status: {})",
        address,
        response.status().unwrap_or("unknown")
    );

    Ok(DeviceConfig::new(name, address).with_port(request.port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_address_is_rejected_without_a_request() {
        let request = SetupRequest::new("   ", "Den");
        let result = query_device(&request, Duration::from_millis(100)).await;
        assert_eq!(result, Err(SetupError::MissingAddress));
    }

    #[test]
    fn test_request_deserializes_missing_fields() {
        let request: SetupRequest = serde_json::from_str(r#"{"address": "10.0.0.4"}"#).unwrap();
        assert_eq!(request.address, "10.0.0.4");
        assert!(request.name.is_empty());
        assert_eq!(request.port, DEFAULT_PORT);
    }
}
