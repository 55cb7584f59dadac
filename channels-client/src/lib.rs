//! HTTP client for the Channels app control API
//!
//! The Channels app exposes an unauthenticated JSON API on port 57000
//! (`http://{host}:57000/api/...`). This crate wraps its endpoints and folds
//! every transport problem into a small status vocabulary so callers never
//! have to deal with HTTP errors directly:
//!
//! - timeout, refused/reset connection, DNS failure, unparseable body → [`ApiResponse::Offline`]
//! - non-success HTTP status → [`ApiResponse::Error`]
//! - anything that parses as JSON → [`ApiResponse::Body`]
//!
//! ```rust,no_run
//! # async fn demo() {
//! use channels_client::ChannelsClient;
//!
//! let client = ChannelsClient::new("192.168.1.20", channels_client::DEFAULT_PORT);
//! let status = client.status().await;
//! if status.is_offline() {
//!     println!("Channels is not running");
//! }
//! # }
//! ```
//!
//! Requests are independent: there are no retries, and two concurrent calls
//! against the same device may complete in any order.

mod error;
mod response;

pub use error::{ApiError, Result, TransportError};
pub use response::ApiResponse;

use std::fmt::Display;
use std::time::Duration;

use reqwest::{Method, Url};
use serde_json::{json, Value};

/// Port the Channels app listens on unless told otherwise
pub const DEFAULT_PORT: u16 = 57000;

/// Total time budget for a single request, body included
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for one Channels app instance
#[derive(Debug, Clone)]
pub struct ChannelsClient {
    http: reqwest::Client,
    host: String,
    port: u16,
    timeout: Duration,
}

impl ChannelsClient {
    /// Create a client with the default 5 second request timeout
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::with_timeout(host, port, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom total request timeout
    pub fn with_timeout(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Base URL of the device, e.g. `http://192.168.1.20:57000`
    pub fn base_url(&self) -> String {
        // Bare IPv6 literals need brackets in a URL authority
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, TransportError> {
        let mut url =
            Url::parse(&self.base_url()).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.base_url()))?
            .clear()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> std::result::Result<Value, TransportError> {
        let url = self.endpoint(segments)?;
        tracing::debug!("{} {}", method, url.path());

        let mut request = self.http.request(method, url).timeout(self.timeout);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        // The app is not consistent about Content-Type, so ignore it and parse the bytes
        let bytes = response.bytes().await?;
        // Commands often answer with no body at all
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// Send one request and normalize the outcome
    async fn request(&self, method: Method, segments: &[&str], body: Option<&Value>) -> ApiResponse {
        match self.send(method, segments, body).await {
            Ok(value) => ApiResponse::Body(value),
            Err(e) if e.is_offline() => {
                tracing::debug!("{}:{} unreachable: {}", self.host, self.port, e);
                ApiResponse::Offline
            }
            Err(e) => {
                tracing::debug!("{}:{} returned an error: {}", self.host, self.port, e);
                ApiResponse::Error
            }
        }
    }

    /// GET `/api/{segments...}`
    pub async fn get(&self, segments: &[&str]) -> ApiResponse {
        self.request(Method::GET, segments, None).await
    }

    /// POST `/api/{segments...}` with an optional JSON body
    pub async fn post(&self, segments: &[&str], body: Option<&Value>) -> ApiResponse {
        self.request(Method::POST, segments, body).await
    }

    /// PUT `/api/{segments...}` with an optional JSON body
    pub async fn put(&self, segments: &[&str], body: Option<&Value>) -> ApiResponse {
        self.request(Method::PUT, segments, body).await
    }

    /// DELETE `/api/{segments...}`
    pub async fn delete(&self, segments: &[&str]) -> ApiResponse {
        self.request(Method::DELETE, segments, None).await
    }

    /// Fire a named command: POST `/api/{segments...}` without a body
    pub async fn command(&self, segments: &[&str]) -> ApiResponse {
        self.post(segments, None).await
    }

    // --- Status ---

    /// Current playback status
    pub async fn status(&self) -> ApiResponse {
        self.get(&["status"]).await
    }

    /// Favorite channels; empty unless the app answered with a JSON array
    pub async fn favorite_channels(&self) -> Vec<Value> {
        match self.get(&["favorite_channels"]).await {
            ApiResponse::Body(Value::Array(channels)) => channels,
            _ => Vec::new(),
        }
    }

    // --- Playback ---

    pub async fn toggle_pause(&self) -> ApiResponse {
        self.command(&["toggle_pause"]).await
    }

    pub async fn pause(&self) -> ApiResponse {
        self.command(&["pause"]).await
    }

    pub async fn resume(&self) -> ApiResponse {
        self.command(&["resume"]).await
    }

    pub async fn stop(&self) -> ApiResponse {
        self.command(&["stop"]).await
    }

    /// Seek by a relative, signed number of seconds
    pub async fn seek(&self, seconds: i64) -> ApiResponse {
        self.command(&["seek", &seconds.to_string()]).await
    }

    pub async fn seek_forward(&self) -> ApiResponse {
        self.command(&["seek_forward"]).await
    }

    pub async fn seek_backward(&self) -> ApiResponse {
        self.command(&["seek_backward"]).await
    }

    /// Jump to the next chapter mark
    pub async fn skip_forward(&self) -> ApiResponse {
        self.command(&["skip_forward"]).await
    }

    /// Jump to the previous chapter mark
    pub async fn skip_backward(&self) -> ApiResponse {
        self.command(&["skip_backward"]).await
    }

    // --- Audio / video ---

    pub async fn toggle_mute(&self) -> ApiResponse {
        self.command(&["toggle_mute"]).await
    }

    /// Toggle picture-in-picture
    pub async fn toggle_pip(&self) -> ApiResponse {
        self.command(&["toggle_pip"]).await
    }

    // --- Channels ---

    pub async fn channel_up(&self) -> ApiResponse {
        self.command(&["channel_up"]).await
    }

    pub async fn channel_down(&self) -> ApiResponse {
        self.command(&["channel_down"]).await
    }

    /// Jump back to the last watched channel
    pub async fn previous_channel(&self) -> ApiResponse {
        self.command(&["previous_channel"]).await
    }

    pub async fn play_channel(&self, number: impl Display) -> ApiResponse {
        self.command(&["play", "channel", &number.to_string()]).await
    }

    pub async fn play_recording(&self, id: impl Display) -> ApiResponse {
        self.command(&["play", "recording", &id.to_string()]).await
    }

    // --- UI ---

    /// Open a named section of the app, e.g. `Guide` or `Live TV`
    pub async fn navigate(&self, section: &str) -> ApiResponse {
        self.command(&["navigate", section]).await
    }

    /// Show an in-app notification
    pub async fn notify(&self, title: &str, message: &str) -> ApiResponse {
        let body = json!({ "title": title, "message": message });
        self.post(&["notify"], Some(&body)).await
    }

    // --- Captions / recording ---

    pub async fn toggle_cc(&self) -> ApiResponse {
        self.command(&["toggle_cc"]).await
    }

    pub async fn toggle_record(&self) -> ApiResponse {
        self.command(&["toggle_record"]).await
    }
}
