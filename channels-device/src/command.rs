//! Command dispatch for the media-player entity
//!
//! Maps the host's command identifiers (plus parameters) onto adapter
//! methods and reports the result as a [`StatusCode`]. Adapter failures
//! become `BadRequest`; they never escape this boundary.

use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::device::DeviceAdapter;

/// Result of one dispatched command, as reported back to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    BadRequest,
    NotImplemented,
}

impl StatusCode {
    /// HTTP-style numeric code used by the host protocol
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotImplemented => 501,
        }
    }
}

/// Entity features advertised for a Channels device
pub const FEATURES: &[&str] = &[
    "play_pause",
    "stop",
    "next",
    "previous",
    "fast_forward",
    "rewind",
    "mute_toggle",
    "seek",
    "media_duration",
    "media_position",
    "media_title",
    "media_artist",
    "media_image_url",
    "media_type",
    "channel_switcher",
];

/// Extra buttons the user can assign on the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleCommand {
    ToggleCc,
    TogglePip,
    ToggleRecord,
    SeekForward,
    SeekBackward,
}

impl SimpleCommand {
    pub const ALL: [SimpleCommand; 5] = [
        SimpleCommand::ToggleCc,
        SimpleCommand::TogglePip,
        SimpleCommand::ToggleRecord,
        SimpleCommand::SeekForward,
        SimpleCommand::SeekBackward,
    ];

    /// Label shown in the remote configurator, also used as the command id
    pub fn label(&self) -> &'static str {
        match self {
            SimpleCommand::ToggleCc => "Toggle Closed Captions",
            SimpleCommand::TogglePip => "Toggle Picture in Picture",
            SimpleCommand::ToggleRecord => "Toggle Record",
            SimpleCommand::SeekForward => "Seek Forward",
            SimpleCommand::SeekBackward => "Seek Backward",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.label() == label)
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(SimpleCommand::label).collect()
    }
}

/// A parsed, executable command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCommand {
    PlayPause,
    Stop,
    /// Mapped to channel up
    Next,
    /// Mapped to the previously watched channel
    Previous,
    /// Mapped to skip forward (next chapter mark)
    FastForward,
    /// Mapped to skip backward (previous chapter mark)
    Rewind,
    MuteToggle,
    Seek { position: u64 },
    ChannelUp,
    ChannelDown,
    Simple(SimpleCommand),
}

/// Why a command could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("unsupported command: {0}")]
    Unsupported(String),

    #[error("missing or invalid parameter: {0}")]
    InvalidParameter(&'static str),
}

impl DispatchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::Unsupported(_) => StatusCode::NotImplemented,
            DispatchError::InvalidParameter(_) => StatusCode::BadRequest,
        }
    }
}

impl MediaCommand {
    pub fn parse(cmd_id: &str, params: Option<&Map<String, Value>>) -> Result<Self, DispatchError> {
        let command = match cmd_id {
            "play_pause" => MediaCommand::PlayPause,
            "stop" => MediaCommand::Stop,
            "next" => MediaCommand::Next,
            "previous" => MediaCommand::Previous,
            "fast_forward" => MediaCommand::FastForward,
            "rewind" => MediaCommand::Rewind,
            "mute_toggle" => MediaCommand::MuteToggle,
            "channel_up" => MediaCommand::ChannelUp,
            "channel_down" => MediaCommand::ChannelDown,
            "seek" => MediaCommand::Seek {
                position: seek_position(params)
                    .ok_or(DispatchError::InvalidParameter("media_position"))?,
            },
            other => match SimpleCommand::from_label(other) {
                Some(simple) => MediaCommand::Simple(simple),
                None => return Err(DispatchError::Unsupported(other.to_string())),
            },
        };
        Ok(command)
    }

    /// Run against the adapter
    pub async fn execute(self, device: &DeviceAdapter) -> crate::Result<()> {
        match self {
            MediaCommand::PlayPause => device.play_pause().await,
            MediaCommand::Stop => device.stop().await,
            MediaCommand::Next | MediaCommand::ChannelUp => device.channel_up().await,
            MediaCommand::Previous => device.previous_channel().await,
            MediaCommand::FastForward => device.skip_forward().await,
            MediaCommand::Rewind => device.skip_backward().await,
            MediaCommand::MuteToggle => device.mute_toggle().await,
            MediaCommand::Seek { position } => device.seek(position).await,
            MediaCommand::ChannelDown => device.channel_down().await,
            MediaCommand::Simple(SimpleCommand::ToggleCc) => device.toggle_cc().await,
            MediaCommand::Simple(SimpleCommand::TogglePip) => device.toggle_pip().await,
            MediaCommand::Simple(SimpleCommand::ToggleRecord) => device.toggle_record().await,
            MediaCommand::Simple(SimpleCommand::SeekForward) => device.seek_forward().await,
            MediaCommand::Simple(SimpleCommand::SeekBackward) => device.seek_backward().await,
        }
    }
}

/// `media_position` as whole seconds; accepts integers, floats and numeric strings
fn seek_position(params: Option<&Map<String, Value>>) -> Option<u64> {
    match params?.get("media_position")? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Execute one host command and push the (possibly stale) attributes afterwards.
///
/// Attributes are not re-fetched; the next poll tick corrects any drift.
pub async fn dispatch(
    device: &DeviceAdapter,
    cmd_id: &str,
    params: Option<&Map<String, Value>>,
) -> StatusCode {
    info!("[{}] Received command: {} {:?}", device.log_id(), cmd_id, params);

    let command = match MediaCommand::parse(cmd_id, params) {
        Ok(command) => command,
        Err(e) => {
            warn!("[{}] {}", device.log_id(), e);
            return e.status_code();
        }
    };

    match command.execute(device).await {
        Ok(()) => {
            device.publish();
            StatusCode::Ok
        }
        Err(e) => {
            error!("[{}] Error executing command {}: {}", device.log_id(), cmd_id, e);
            StatusCode::BadRequest
        }
    }
}
