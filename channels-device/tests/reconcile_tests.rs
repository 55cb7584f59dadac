//! Reconciliation tests: status mapping table plus property checks
//!
//! The property tests feed arbitrary JSON into `reconcile` and check that it
//! never panics and that successful snapshots are internally consistent.

use channels_device::{reconcile, MediaType, PlaybackAttributes, PlayerState, ReconcileError};
use proptest::prelude::*;
use rstest::rstest;
use serde_json::{json, Value};

// ============================================================================
// Status mapping
// ============================================================================

#[rstest]
#[case(json!({ "status": "playing" }), PlayerState::Playing)]
#[case(json!({ "status": "paused" }), PlayerState::Paused)]
#[case(json!({ "status": "stopped" }), PlayerState::Off)]
#[case(json!({ "status": "offline" }), PlayerState::Unavailable)]
#[case(json!({ "status": "error" }), PlayerState::Unknown)]
#[case(json!({ "status": "buffering" }), PlayerState::Unknown)]
#[case(json!({ "status": 3 }), PlayerState::Unknown)]
#[case(json!({}), PlayerState::Off)]
fn test_status_maps_to_state(#[case] payload: Value, #[case] expected: PlayerState) {
    let attributes = reconcile(&payload).unwrap();
    assert_eq!(attributes.state, expected);
}

#[rstest]
#[case(json!({ "muted": true }), true)]
#[case(json!({ "muted": false }), false)]
#[case(json!({ "muted": "yes" }), false)]
#[case(json!({}), false)]
fn test_muted_defaults_to_false(#[case] payload: Value, #[case] expected: bool) {
    assert_eq!(reconcile(&payload).unwrap().muted, expected);
}

// ============================================================================
// Content source selection
// ============================================================================

#[test]
fn test_idle_payload_clears_all_content() {
    let payload = json!({
        "status": "stopped",
        "muted": true,
        "now_playing": null,
        "channel": null,
        "playback_time": 0
    });

    let attributes = reconcile(&payload).unwrap();
    assert_eq!(
        attributes,
        PlaybackAttributes {
            state: PlayerState::Off,
            muted: true,
            media_position: Some(0),
            ..Default::default()
        }
    );
    assert!(attributes.has_no_media());
}

#[test]
fn test_program_without_channel_has_no_artist() {
    let payload = json!({
        "status": "playing",
        "now_playing": { "title": "Jeopardy!", "type": "episode" }
    });

    let attributes = reconcile(&payload).unwrap();
    assert_eq!(attributes.media_type, Some(MediaType::TvShow));
    assert_eq!(attributes.media_title.as_deref(), Some("Jeopardy!"));
    assert_eq!(attributes.media_artist, None);
    assert_eq!(attributes.media_image_url, None);
}

#[rstest]
#[case(json!({ "title": "Heat", "type": "movie" }), MediaType::Video)]
#[case(json!({ "title": "Jeopardy!", "type": "episode" }), MediaType::TvShow)]
#[case(json!({ "title": "Jeopardy!" }), MediaType::TvShow)]
#[case(json!({ "title": "Jeopardy!", "type": null }), MediaType::TvShow)]
#[case(json!({ "title": "Jeopardy!", "type": 7 }), MediaType::TvShow)]
#[case(json!({ "title": "Heat", "type": "Movie" }), MediaType::TvShow)]
fn test_program_type_maps_to_media_type(#[case] program: Value, #[case] expected: MediaType) {
    let attributes = reconcile(&json!({ "status": "playing", "now_playing": program })).unwrap();
    assert_eq!(attributes.media_type, Some(expected));
}

#[test]
fn test_program_without_any_title() {
    let attributes = reconcile(&json!({ "now_playing": { "type": "movie" } })).unwrap();
    assert_eq!(attributes.media_type, Some(MediaType::Video));
    assert_eq!(attributes.media_title, None);
}

#[test]
fn test_episode_title_without_title_is_ignored() {
    let payload = json!({
        "now_playing": { "episode_title": "Pilot" }
    });

    let attributes = reconcile(&payload).unwrap();
    assert_eq!(attributes.media_title, None);
    assert_eq!(attributes.media_type, Some(MediaType::TvShow));
}

#[test]
fn test_errors_name_the_field() {
    let error = reconcile(&json!({ "playback_time": [1, 2] })).unwrap_err();
    assert!(matches!(error, ReconcileError::InvalidNumber { field: "playback_time", .. }));
    assert!(error.to_string().contains("playback_time"));

    let error = reconcile(&json!({ "channel": "NBC" })).unwrap_err();
    assert!(matches!(error, ReconcileError::UnexpectedShape { field: "channel", .. }));
}

#[test]
fn test_serialized_attribute_keys() {
    let payload = json!({
        "status": "playing",
        "now_playing": { "title": "Heat", "type": "movie", "duration": 9000 },
        "playback_time": 10
    });

    let value = serde_json::to_value(reconcile(&payload).unwrap()).unwrap();
    assert_eq!(value["state"], json!("PLAYING"));
    assert_eq!(value["media_type"], json!("VIDEO"));
    assert_eq!(value["media_duration"], json!(9000));
    assert_eq!(value["media_position"], json!(10));
}

// ============================================================================
// Property tests
// ============================================================================

/// Arbitrary JSON, a few levels deep
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_filter("finite", |f| f.is_finite()).prop_map(Value::from),
        "[a-z0-9 ]{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::hash_map("[a-z_]{1,12}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Status payloads built from the keys the app actually sends
fn status_payload_strategy() -> impl Strategy<Value = Value> {
    let status = prop_oneof![
        Just(json!("playing")),
        Just(json!("paused")),
        Just(json!("stopped")),
        Just(json!("offline")),
        "[a-z]{0,8}".prop_map(Value::from),
    ];
    let program = prop::option::of(
        (
            "[A-Za-z ]{0,16}",
            prop::option::of("[A-Za-z ]{1,16}"),
            prop_oneof![Just("movie"), Just("episode"), Just("Movie"), Just("special")],
            prop::option::of(0u64..20_000),
        )
            .prop_map(|(title, episode, kind, duration)| {
                json!({ "title": title, "episode_title": episode, "type": kind, "duration": duration })
            }),
    );
    let channel = prop::option::of(
        ("[A-Z]{0,6}", 1u32..1000).prop_map(|(name, number)| json!({ "name": name, "number": number.to_string() })),
    );

    (status, any::<bool>(), prop::option::of(0u64..100_000), program, channel).prop_map(
        |(status, muted, position, program, channel)| {
            json!({
                "status": status,
                "muted": muted,
                "playback_time": position,
                "now_playing": program,
                "channel": channel,
            })
        },
    )
}

proptest! {
    #[test]
    fn prop_reconcile_never_panics(payload in json_strategy()) {
        let _ = reconcile(&payload);
    }

    #[test]
    fn prop_well_formed_payloads_reconcile(payload in status_payload_strategy()) {
        let attributes = reconcile(&payload).unwrap();

        prop_assert_eq!(attributes.muted, payload["muted"].as_bool().unwrap());
        prop_assert_eq!(attributes.media_position, payload["playback_time"].as_u64());

        let has_program = payload["now_playing"].is_object();
        let has_channel = payload["channel"].is_object();
        prop_assert_eq!(attributes.media_type.is_some(), has_program || has_channel);
        if !has_program && !has_channel {
            prop_assert!(attributes.has_no_media());
        }
        if !has_program {
            prop_assert_eq!(attributes.media_duration, None);
        } else {
            let expected = if payload["now_playing"]["type"] == "movie" {
                MediaType::Video
            } else {
                MediaType::TvShow
            };
            prop_assert_eq!(attributes.media_type, Some(expected));
        }
    }

    #[test]
    fn prop_reconcile_is_deterministic(payload in status_payload_strategy()) {
        prop_assert_eq!(reconcile(&payload), reconcile(&payload));
    }
}
