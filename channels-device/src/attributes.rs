//! Canonical "now playing" attributes of a Channels device
//!
//! These are what the remote-control host sees. They are always derived
//! from the latest status payload (see [`crate::reconcile`]) and serialize
//! with the host's attribute keys.

use serde::{Deserialize, Serialize};

/// Power/playback state of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerState {
    Playing,
    Paused,
    Off,
    #[default]
    Unknown,
    Unavailable,
}

impl PlayerState {
    /// Map a raw Channels `status` string.
    ///
    /// Statuses this crate does not know about become `Unknown`, so a newer
    /// app version cannot break reconciliation.
    pub fn from_status(status: &str) -> Self {
        match status {
            "playing" => PlayerState::Playing,
            "paused" => PlayerState::Paused,
            "stopped" => PlayerState::Off,
            "error" => PlayerState::Unknown,
            "offline" => PlayerState::Unavailable,
            _ => PlayerState::Unknown,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlayerState::Playing)
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, PlayerState::Unavailable)
    }
}

/// Kind of content currently on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Video,
    #[serde(rename = "TVSHOW")]
    TvShow,
}

/// Snapshot of everything the host displays for one device
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackAttributes {
    pub state: PlayerState,
    pub muted: bool,
    pub media_type: Option<MediaType>,
    pub media_title: Option<String>,
    pub media_artist: Option<String>,
    pub media_image_url: Option<String>,
    /// Seconds into the current program
    pub media_position: Option<u64>,
    /// Program length in seconds
    pub media_duration: Option<u64>,
}

impl PlaybackAttributes {
    /// True when none of the content fields are set
    pub fn has_no_media(&self) -> bool {
        self.media_type.is_none()
            && self.media_title.is_none()
            && self.media_artist.is_none()
            && self.media_image_url.is_none()
            && self.media_duration.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_status() {
        assert_eq!(PlayerState::from_status("playing"), PlayerState::Playing);
        assert_eq!(PlayerState::from_status("paused"), PlayerState::Paused);
        assert_eq!(PlayerState::from_status("stopped"), PlayerState::Off);
        assert_eq!(PlayerState::from_status("error"), PlayerState::Unknown);
        assert_eq!(PlayerState::from_status("offline"), PlayerState::Unavailable);
        assert_eq!(PlayerState::from_status("buffering"), PlayerState::Unknown);
        assert_eq!(PlayerState::from_status("PLAYING"), PlayerState::Unknown);
    }

    #[test]
    fn test_default_snapshot() {
        let attributes = PlaybackAttributes::default();
        assert_eq!(attributes.state, PlayerState::Unknown);
        assert!(!attributes.muted);
        assert!(attributes.has_no_media());
        assert_eq!(attributes.media_position, None);
    }

    #[test]
    fn test_serialized_keys_and_values() {
        let attributes = PlaybackAttributes {
            state: PlayerState::Playing,
            muted: true,
            media_type: Some(MediaType::TvShow),
            media_title: Some("News".to_string()),
            media_artist: Some("Ch. 7".to_string()),
            media_image_url: None,
            media_position: Some(12),
            media_duration: None,
        };

        let value = serde_json::to_value(&attributes).unwrap();
        assert_eq!(value["state"], json!("PLAYING"));
        assert_eq!(value["muted"], json!(true));
        assert_eq!(value["media_type"], json!("TVSHOW"));
        assert_eq!(value["media_artist"], json!("Ch. 7"));
        assert_eq!(value["media_image_url"], json!(null));
        assert_eq!(value["media_position"], json!(12));

        assert_eq!(serde_json::to_value(MediaType::Video).unwrap(), json!("VIDEO"));
        assert_eq!(
            serde_json::to_value(PlayerState::Unavailable).unwrap(),
            json!("UNAVAILABLE")
        );
    }
}
