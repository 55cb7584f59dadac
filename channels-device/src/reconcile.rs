//! Status payload reconciliation
//!
//! Turns the loosely structured JSON returned by `/api/status` into a
//! [`PlaybackAttributes`] snapshot. The payload is never trusted to follow a
//! schema: every field is looked up by key and checked before use.
//!
//! Content fields come from exactly one of three sources, in priority order:
//!
//! 1. a `now_playing` program (with an optional sibling `channel`),
//! 2. a bare `channel` when nothing is scheduled,
//! 3. nothing at all, in which case every content field is cleared.
//!
//! "Present" follows the app's loose conventions: `null`, `false`, `0`, `""`,
//! `[]` and `{}` all mean absent.

use serde_json::{Map, Value};

use crate::attributes::{MediaType, PlaybackAttributes, PlayerState};
use crate::error::ReconcileError;

type Object = Map<String, Value>;

/// Content fields derived from `now_playing` / `channel`
#[derive(Debug, Default)]
struct MediaContent {
    media_type: Option<MediaType>,
    title: Option<String>,
    artist: Option<String>,
    image_url: Option<String>,
    duration: Option<u64>,
}

/// Build a full attribute snapshot from one status payload.
///
/// Pure: no I/O, no access to previous attributes. Fails only when a field
/// is present with a shape that cannot be interpreted at all.
pub fn reconcile(payload: &Value) -> Result<PlaybackAttributes, ReconcileError> {
    let payload = payload.as_object().ok_or_else(|| ReconcileError::UnexpectedShape {
        field: "payload",
        found: describe(payload),
    })?;

    let state = match payload.get("status") {
        // The app omits `status` when nothing has been played yet
        None => PlayerState::Off,
        Some(Value::String(status)) => PlayerState::from_status(status),
        Some(_) => PlayerState::Unknown,
    };
    let muted = payload.get("muted").and_then(Value::as_bool).unwrap_or(false);
    let media_position = seconds(payload.get("playback_time"), "playback_time")?;

    let now_playing = present_object(payload.get("now_playing"), "now_playing")?;
    let channel = present_object(payload.get("channel"), "channel")?;

    let content = match (now_playing, channel) {
        (Some(program), channel) => from_program(program, channel)?,
        (None, Some(channel)) => from_channel(channel)?,
        (None, None) => MediaContent::default(),
    };

    Ok(PlaybackAttributes {
        state,
        muted,
        media_type: content.media_type,
        media_title: content.title,
        media_artist: content.artist,
        media_image_url: content.image_url,
        media_position,
        media_duration: content.duration,
    })
}

fn from_program(program: &Object, channel: Option<&Object>) -> Result<MediaContent, ReconcileError> {
    let media_type = match program.get("type").and_then(Value::as_str) {
        Some("movie") => MediaType::Video,
        _ => MediaType::TvShow,
    };

    let title = match (text(program.get("title")), text(program.get("episode_title"))) {
        (Some(title), Some(episode)) => Some(format!("{} - {}", title, episode)),
        (Some(title), None) => Some(title),
        (None, _) => None,
    };

    let artist = channel.and_then(|c| text(c.get("name")));

    let image_url = text(program.get("image_url"))
        .or_else(|| text(program.get("thumb_url")))
        .or_else(|| channel.and_then(|c| text(c.get("image_url"))));

    Ok(MediaContent {
        media_type: Some(media_type),
        title,
        artist,
        image_url,
        duration: seconds(program.get("duration"), "duration")?,
    })
}

fn from_channel(channel: &Object) -> Result<MediaContent, ReconcileError> {
    let number = match channel.get("number") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(number)) => number.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => {
            return Err(ReconcileError::UnexpectedShape {
                field: "channel.number",
                found: describe(other),
            })
        }
    };

    Ok(MediaContent {
        media_type: Some(MediaType::TvShow),
        title: text(channel.get("name")),
        artist: Some(format!("Ch. {}", number)),
        image_url: text(channel.get("image_url")),
        // Live channels without a scheduled program have no known length
        duration: None,
    })
}

/// An object that counts as present, `None` for any "empty" value
fn present_object<'a>(
    value: Option<&'a Value>,
    field: &'static str,
) -> Result<Option<&'a Object>, ReconcileError> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::Object(object)) if object.is_empty() => Ok(None),
        Some(Value::Object(object)) => Ok(Some(object)),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::Array(items)) if items.is_empty() => Ok(None),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
        Some(other) => Err(ReconcileError::UnexpectedShape {
            field,
            found: describe(other),
        }),
    }
}

/// Display text: non-empty strings as-is, numbers rendered
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Whole seconds from an integer, a float (truncated) or a numeric string
fn seconds(value: Option<&Value>, field: &'static str) -> Result<Option<u64>, ReconcileError> {
    let invalid = |v: &Value| ReconcileError::InvalidNumber {
        field,
        found: describe(v),
    };

    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    match value {
        Value::Number(n) => {
            if let Some(secs) = n.as_u64() {
                Ok(Some(secs))
            } else if n.is_i64() {
                Err(invalid(value))
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f >= 0.0 => Ok(Some(f.trunc() as u64)),
                    _ => Err(invalid(value)),
                }
            }
        }
        Value::String(s) => s.trim().parse::<u64>().map(Some).map_err(|_| invalid(value)),
        _ => Err(invalid(value)),
    }
}

fn describe(value: &Value) -> String {
    let mut found = value.to_string();
    if found.len() > 64 {
        let mut end = 64;
        while !found.is_char_boundary(end) {
            end -= 1;
        }
        found.truncate(end);
        found.push('…');
    }
    found
}
