//! Channels Device Adapter
//!
//! Bridges one Channels DVR client app to a remote-control host: polls the
//! app's control API, reconciles the status payload into a flat attribute
//! snapshot, and turns host commands into API calls.
//!
//! # Architecture
//!
//! ```text
//! PollingTask ──tick──▶ DeviceAdapter ──status──▶ ChannelsClient ──HTTP──▶ app
//!                           │
//!                      reconcile()
//!                           │
//!                  AttributePublisher ──▶ sinks / watch receivers
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use channels_device::{AdapterConfig, DeviceAdapter, DeviceConfig, PollingTask};
//!
//! let config = AdapterConfig::from_env();
//! let adapter = Arc::new(DeviceAdapter::with_config(
//!     DeviceConfig::new("Living Room", "192.168.1.5"),
//!     &config,
//! ));
//! adapter.establish_connection().await?;
//!
//! let poller = PollingTask::for_adapter(Arc::clone(&adapter), &config);
//! let mut updates = adapter.subscribe();
//! while updates.changed().await.is_ok() {
//!     println!("{:?}", updates.borrow().state);
//! }
//! ```

pub mod attributes;
pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod poller;
pub mod publisher;
pub mod reconcile;
pub mod setup;

pub use attributes::{MediaType, PlaybackAttributes, PlayerState};
pub use command::{dispatch, DispatchError, MediaCommand, SimpleCommand, StatusCode, FEATURES};
pub use config::{AdapterConfig, DeviceConfig, DEFAULT_POLL_INTERVAL, DEFAULT_PORT};
pub use device::{seek_delta, DeviceAdapter, PollOutcome};
pub use error::{DeviceError, ReconcileError, Result};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use poller::PollingTask;
pub use publisher::{AttributePublisher, AttributeSink};
pub use reconcile::reconcile;
pub use setup::{query_device, SetupError, SetupRequest};

pub use channels_client::{ApiError, ApiResponse, ChannelsClient};
