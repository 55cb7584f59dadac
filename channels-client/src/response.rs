//! Normalized response envelope

use serde_json::{json, Value};

use crate::error::ApiError;

/// Outcome of one request against the control API.
///
/// Every client method returns one of these instead of an error: transport
/// trouble is `Offline`, an HTTP error status is `Error`, and anything that
/// parsed as JSON is `Body`.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Parsed JSON body of a successful response
    Body(Value),
    /// Timeout, connection failure or unparseable body
    Offline,
    /// The server answered with a non-success HTTP status
    Error,
}

impl ApiResponse {
    /// The `status` string of this response.
    ///
    /// For a body this is its `"status"` field, if it is a string.
    pub fn status(&self) -> Option<&str> {
        match self {
            ApiResponse::Body(body) => body.get("status").and_then(Value::as_str),
            ApiResponse::Offline => Some("offline"),
            ApiResponse::Error => Some("error"),
        }
    }

    /// True when the device must be treated as unreachable.
    ///
    /// A body that itself reports `"status": "offline"` counts too.
    pub fn is_offline(&self) -> bool {
        self.status() == Some("offline")
    }

    /// The JSON envelope: `{"status": "offline"}`, `{"status": "error"}` or the body.
    pub fn to_envelope(&self) -> Value {
        match self {
            ApiResponse::Body(body) => body.clone(),
            ApiResponse::Offline => json!({ "status": "offline" }),
            ApiResponse::Error => json!({ "status": "error" }),
        }
    }

    /// Consume into the JSON envelope without cloning the body.
    pub fn into_envelope(self) -> Value {
        match self {
            ApiResponse::Body(body) => body,
            other => other.to_envelope(),
        }
    }

    /// Convert to a `Result` for callers that propagate failures.
    pub fn into_result(self) -> Result<Value, ApiError> {
        match self {
            ApiResponse::Body(body) => Ok(body),
            ApiResponse::Offline => Err(ApiError::Offline),
            ApiResponse::Error => Err(ApiError::Application),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelopes() {
        assert_eq!(ApiResponse::Offline.to_envelope(), json!({ "status": "offline" }));
        assert_eq!(ApiResponse::Error.to_envelope(), json!({ "status": "error" }));

        let body = json!({ "status": "playing", "muted": false });
        assert_eq!(ApiResponse::Body(body.clone()).into_envelope(), body);
    }

    #[test]
    fn test_status_and_offline() {
        assert!(ApiResponse::Offline.is_offline());
        assert!(!ApiResponse::Error.is_offline());
        assert!(ApiResponse::Body(json!({ "status": "offline" })).is_offline());
        assert!(!ApiResponse::Body(json!({ "status": "paused" })).is_offline());

        assert_eq!(ApiResponse::Body(json!({ "status": 3 })).status(), None);
        assert_eq!(ApiResponse::Body(json!([])).status(), None);
        assert_eq!(ApiResponse::Error.status(), Some("error"));
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ApiResponse::Offline.into_result(), Err(ApiError::Offline));
        assert_eq!(ApiResponse::Error.into_result(), Err(ApiError::Application));
        assert_eq!(
            ApiResponse::Body(json!({ "status": "stopped" })).into_result(),
            Ok(json!({ "status": "stopped" }))
        );
    }
}
