//! Error types for channels-device

use channels_client::ApiError;
use thiserror::Error;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, DeviceError>;

/// A status payload could not be turned into attributes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// A field that must be an object (or absent) held something else
    #[error("unexpected shape for '{field}': {found}")]
    UnexpectedShape { field: &'static str, found: String },

    /// A numeric field could not be read as a non-negative number of seconds
    #[error("invalid number for '{field}': {found}")]
    InvalidNumber { field: &'static str, found: String },
}

/// Errors surfaced by [`crate::DeviceAdapter`]
#[derive(Debug, Error)]
pub enum DeviceError {
    /// First contact with the app failed; setup must not proceed
    #[error("Channels app at {address} is offline or unreachable")]
    ConnectionRefused { address: String },

    /// A command or request was answered with offline/error
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The status payload could not be reconciled
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),
}
