//! Device adapter for one Channels app instance
//!
//! Owns the connection lifecycle, the poll tick, the attribute snapshot and
//! the translation of playback commands into control API calls.
//!
//! Failure handling differs per entry point:
//! - [`DeviceAdapter::establish_connection`] fails hard when the app is unreachable
//! - [`DeviceAdapter::poll_device`] never fails; problems degrade the state to `Unavailable`
//! - command methods return the failure to the caller

use std::fmt::Display;
use std::sync::Arc;

use channels_client::{ApiResponse, ChannelsClient};
use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::attributes::{PlaybackAttributes, PlayerState};
use crate::config::{AdapterConfig, DeviceConfig};
use crate::error::{DeviceError, Result};
use crate::publisher::{AttributePublisher, AttributeSink};
use crate::reconcile::reconcile;

/// What a call to [`DeviceAdapter::poll_device`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Status fetched and reconciled
    Updated(PlayerState),
    /// App offline or payload unusable; only `state` was changed
    Unavailable,
    /// Another poll was still in flight, nothing was done
    Skipped,
}

/// Adapter between the host's entity framework and one Channels app
pub struct DeviceAdapter {
    config: DeviceConfig,
    client: ChannelsClient,
    attributes: RwLock<PlaybackAttributes>,
    publisher: AttributePublisher,
    /// Held for the whole fetch + reconcile of a poll or connection attempt
    poll_gate: Mutex<()>,
}

impl DeviceAdapter {
    pub fn new(config: DeviceConfig) -> Self {
        Self::with_config(config, &AdapterConfig::default())
    }

    pub fn with_config(config: DeviceConfig, adapter_config: &AdapterConfig) -> Self {
        let client = ChannelsClient::with_timeout(
            config.address().to_string(),
            config.port(),
            adapter_config.request_timeout,
        );
        Self::with_client(config, client)
    }

    /// Use a pre-built client, e.g. one pointed at a test server
    pub fn with_client(config: DeviceConfig, client: ChannelsClient) -> Self {
        let attributes = PlaybackAttributes::default();
        Self {
            publisher: AttributePublisher::new(config.identifier().to_string(), attributes.clone()),
            attributes: RwLock::new(attributes),
            poll_gate: Mutex::new(()),
            client,
            config,
        }
    }

    pub fn identifier(&self) -> &str {
        self.config.identifier()
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn address(&self) -> &str {
        self.config.address()
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Prefix for log lines: the name, or the identifier when unnamed
    pub fn log_id(&self) -> &str {
        if self.config.name().is_empty() {
            self.config.identifier()
        } else {
            self.config.name()
        }
    }

    /// Copy of the current snapshot
    pub fn attributes(&self) -> PlaybackAttributes {
        // Recursive read so a sink may read attributes while being published to
        self.attributes.read_recursive().clone()
    }

    pub fn state(&self) -> PlayerState {
        self.attributes.read_recursive().state
    }

    pub fn register_sink(&self, sink: Arc<dyn AttributeSink>) {
        self.publisher.register(sink);
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackAttributes> {
        self.publisher.subscribe()
    }

    /// Push the current snapshot to every consumer
    pub fn publish(&self) {
        // Publishing under the read guard keeps a stale snapshot from being
        // delivered after a newer one
        let attributes = self.attributes.read_recursive();
        self.publisher.publish(&attributes);
    }

    /// First contact with the app.
    ///
    /// An unreachable app is an error here, unlike during polling.
    pub async fn establish_connection(&self) -> Result<()> {
        debug!(
            "[{}] Establishing connection to Channels at {}",
            self.log_id(),
            self.address()
        );
        let _gate = self.poll_gate.lock().await;

        let response = self.client.status().await;
        if response.is_offline() {
            return Err(DeviceError::ConnectionRefused {
                address: self.config.address().to_string(),
            });
        }

        let status = response.status().unwrap_or("unknown").to_string();
        let attributes = reconcile(&response.into_envelope())?;
        *self.attributes.write() = attributes;
        self.publish();

        info!("[{}] Connected to Channels app, status: {}", self.log_id(), status);
        Ok(())
    }

    /// One poll tick.
    ///
    /// Skips if a previous tick is still running. On an offline app or an
    /// unusable payload only `state` becomes `Unavailable`; the rest of the
    /// snapshot keeps its last known values. Publishes exactly once unless
    /// skipped.
    pub async fn poll_device(&self) -> PollOutcome {
        let Ok(_gate) = self.poll_gate.try_lock() else {
            debug!("[{}] Previous poll still in flight, skipping", self.log_id());
            return PollOutcome::Skipped;
        };

        let response = self.client.status().await;
        let outcome = if response.is_offline() {
            warn!("[{}] Channels app is offline", self.log_id());
            self.mark_unavailable();
            PollOutcome::Unavailable
        } else {
            match reconcile(&response.into_envelope()) {
                Ok(attributes) => {
                    let state = attributes.state;
                    *self.attributes.write() = attributes;
                    PollOutcome::Updated(state)
                }
                Err(e) => {
                    error!("[{}] Error polling Channels app: {}", self.log_id(), e);
                    self.mark_unavailable();
                    PollOutcome::Unavailable
                }
            }
        };

        self.publish();
        outcome
    }

    fn mark_unavailable(&self) {
        self.attributes.write().state = PlayerState::Unavailable;
    }

    fn check(&self, command: &str, response: ApiResponse) -> Result<()> {
        match response.into_result() {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!("[{}] {} failed: {}", self.log_id(), command, e);
                Err(e.into())
            }
        }
    }

    // --- Commands ---

    pub async fn play_pause(&self) -> Result<()> {
        debug!("[{}] Toggle play/pause", self.log_id());
        self.check("toggle_pause", self.client.toggle_pause().await)
    }

    pub async fn pause(&self) -> Result<()> {
        debug!("[{}] Pause", self.log_id());
        self.check("pause", self.client.pause().await)
    }

    /// Resume playback
    pub async fn play(&self) -> Result<()> {
        debug!("[{}] Resume", self.log_id());
        self.check("resume", self.client.resume().await)
    }

    pub async fn stop(&self) -> Result<()> {
        debug!("[{}] Stop", self.log_id());
        self.check("stop", self.client.stop().await)
    }

    pub async fn mute_toggle(&self) -> Result<()> {
        debug!("[{}] Toggle mute", self.log_id());
        self.check("toggle_mute", self.client.toggle_mute().await)
    }

    pub async fn channel_up(&self) -> Result<()> {
        debug!("[{}] Channel up", self.log_id());
        self.check("channel_up", self.client.channel_up().await)
    }

    pub async fn channel_down(&self) -> Result<()> {
        debug!("[{}] Channel down", self.log_id());
        self.check("channel_down", self.client.channel_down().await)
    }

    pub async fn previous_channel(&self) -> Result<()> {
        debug!("[{}] Previous channel", self.log_id());
        self.check("previous_channel", self.client.previous_channel().await)
    }

    pub async fn seek_forward(&self) -> Result<()> {
        debug!("[{}] Seek forward", self.log_id());
        self.check("seek_forward", self.client.seek_forward().await)
    }

    pub async fn seek_backward(&self) -> Result<()> {
        debug!("[{}] Seek backward", self.log_id());
        self.check("seek_backward", self.client.seek_backward().await)
    }

    pub async fn skip_forward(&self) -> Result<()> {
        debug!("[{}] Skip forward", self.log_id());
        self.check("skip_forward", self.client.skip_forward().await)
    }

    pub async fn skip_backward(&self) -> Result<()> {
        debug!("[{}] Skip backward", self.log_id());
        self.check("skip_backward", self.client.skip_backward().await)
    }

    /// Seek to an absolute position, in seconds.
    ///
    /// The API only seeks relative to the current position, so the delta
    /// is computed from the last polled `media_position` (0 if unknown).
    /// A zero delta sends nothing.
    pub async fn seek(&self, position: u64) -> Result<()> {
        debug!("[{}] Seek to {} seconds", self.log_id(), position);
        let current = self.attributes.read_recursive().media_position.unwrap_or(0);
        let delta = seek_delta(position, current);
        if delta == 0 {
            debug!("[{}] Already at {} seconds", self.log_id(), position);
            return Ok(());
        }
        self.check("seek", self.client.seek(delta).await)
    }

    pub async fn toggle_cc(&self) -> Result<()> {
        debug!("[{}] Toggle closed captions", self.log_id());
        self.check("toggle_cc", self.client.toggle_cc().await)
    }

    pub async fn toggle_pip(&self) -> Result<()> {
        debug!("[{}] Toggle picture in picture", self.log_id());
        self.check("toggle_pip", self.client.toggle_pip().await)
    }

    pub async fn toggle_record(&self) -> Result<()> {
        debug!("[{}] Toggle record", self.log_id());
        self.check("toggle_record", self.client.toggle_record().await)
    }

    pub async fn play_channel(&self, number: impl Display) -> Result<()> {
        debug!("[{}] Play channel {}", self.log_id(), number);
        self.check("play_channel", self.client.play_channel(number).await)
    }

    pub async fn play_recording(&self, id: impl Display) -> Result<()> {
        debug!("[{}] Play recording {}", self.log_id(), id);
        self.check("play_recording", self.client.play_recording(id).await)
    }

    pub async fn navigate(&self, section: &str) -> Result<()> {
        debug!("[{}] Navigate to {}", self.log_id(), section);
        self.check("navigate", self.client.navigate(section).await)
    }

    pub async fn notify(&self, title: &str, message: &str) -> Result<()> {
        debug!("[{}] Notify: {}", self.log_id(), title);
        self.check("notify", self.client.notify(title, message).await)
    }

    pub async fn favorite_channels(&self) -> Vec<Value> {
        self.client.favorite_channels().await
    }
}

impl std::fmt::Debug for DeviceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceAdapter")
            .field("identifier", &self.config.identifier())
            .field("address", &self.config.address())
            .field("state", &self.state())
            .finish()
    }
}

/// Relative seek needed to go from `current` to `target`
pub fn seek_delta(target: u64, current: u64) -> i64 {
    let delta = i128::from(target) - i128::from(current);
    delta.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_delta() {
        assert_eq!(seek_delta(120, 100), 20);
        assert_eq!(seek_delta(100, 120), -20);
        assert_eq!(seek_delta(45, 45), 0);
        assert_eq!(seek_delta(u64::MAX, 0), i64::MAX);
    }

    #[test]
    fn test_identity() {
        let adapter = DeviceAdapter::new(DeviceConfig::new("Den TV", "10.0.0.9"));
        assert_eq!(adapter.identifier(), "10_0_0_9");
        assert_eq!(adapter.name(), "Den TV");
        assert_eq!(adapter.address(), "10.0.0.9");
        assert_eq!(adapter.log_id(), "Den TV");
        assert_eq!(adapter.state(), PlayerState::Unknown);
        assert!(adapter.attributes().has_no_media());

        let unnamed = DeviceAdapter::new(DeviceConfig::new("", "10.0.0.9"));
        assert_eq!(unnamed.log_id(), "10_0_0_9");
    }
}
