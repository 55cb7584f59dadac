//! Error types for the Channels control API client

use thiserror::Error;

/// Why a single request did not produce a usable JSON body.
///
/// These never leave the client: [`crate::ChannelsClient`] folds them into
/// an [`crate::ApiResponse`] envelope. They exist so the normalization has
/// one place to decide which bucket a failure belongs to, and so the cause
/// can be logged.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The total request budget elapsed
    #[error("request timed out")]
    Timeout,

    /// Connection refused, reset, DNS failure and friends
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other failure while sending the request or reading the body
    #[error("request failed: {0}")]
    Request(String),

    /// The body was not valid JSON
    #[error("invalid JSON body: {0}")]
    Decode(String),

    /// The server answered with a non-success HTTP status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Host/port did not form a valid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// Whether this failure means the device should be considered unreachable.
    ///
    /// Only an HTTP-level error status is an application error; everything
    /// else, including an unparseable body, counts as offline.
    pub fn is_offline(&self) -> bool {
        !matches!(self, TransportError::Status(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else if let Some(status) = error.status() {
            TransportError::Status(status.as_u16())
        } else if error.is_decode() {
            TransportError::Decode(error.to_string())
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

/// Failure surfaced to callers that need a `Result` instead of an envelope.
///
/// Produced by [`crate::ApiResponse::into_result`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The app could not be reached (`{"status": "offline"}`)
    #[error("Channels app is offline or unreachable")]
    Offline,

    /// The app answered with an error (`{"status": "error"}`)
    #[error("Channels app returned an error")]
    Application,
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;
