use futures::executor::block_on;
use futures::stream;

use super::*;
use crate::testing::{sample_user, sample_user_json};

const ORIGIN: &str = "https://tickets.example.com";

fn success_message() -> serde_json::Value {
    serde_json::json!({
        "type": "GOOGLE_AUTH_SUCCESS",
        "authData": { "token": "popup-token", "user": sample_user_json() }
    })
}

fn message(origin: &str, data: serde_json::Value) -> PopupEvent {
    PopupEvent::Message { origin: origin.to_owned(), data }
}

// =============================================================
// PopupMessage wire shape
// =============================================================

#[test]
fn popup_message_uses_type_tag() {
    let msg = PopupMessage::Error { error: "denied".to_owned() };
    assert_eq!(
        serde_json::to_value(&msg).expect("serialize"),
        serde_json::json!({ "type": "GOOGLE_AUTH_ERROR", "error": "denied" })
    );
    let parsed: PopupMessage = serde_json::from_value(success_message()).expect("parse");
    assert_eq!(
        parsed,
        PopupMessage::Success { auth_data: AuthData { token: "popup-token".to_owned(), user: Some(sample_user()) } }
    );
}

// =============================================================
// PopupSettle
// =============================================================

#[test]
fn closed_popup_settles_as_cancelled() {
    let mut settle = PopupSettle::new(ORIGIN);
    let result = settle.handle(PopupEvent::Poll { closed: true }).expect("should settle");
    assert!(!result.is_success());
    assert_eq!(result.error(), Some("Authentication cancelled by user"));
}

#[test]
fn open_popup_poll_does_not_settle() {
    let mut settle = PopupSettle::new(ORIGIN);
    assert!(settle.handle(PopupEvent::Poll { closed: false }).is_none());
    assert!(!settle.is_settled());
}

#[test]
fn foreign_origin_message_is_ignored() {
    let mut settle = PopupSettle::new(ORIGIN);
    assert!(settle.handle(message("https://evil.example", success_message())).is_none());
    assert!(!settle.is_settled());
}

#[test]
fn unrelated_message_payload_is_ignored() {
    let mut settle = PopupSettle::new(ORIGIN);
    assert!(settle.handle(message(ORIGIN, serde_json::json!({ "type": "webpackOk" }))).is_none());
    assert!(settle.handle(message(ORIGIN, serde_json::Value::Null)).is_none());
}

#[test]
fn success_message_settles_with_auth_data() {
    let mut settle = PopupSettle::new(ORIGIN);
    let result = settle.handle(message(ORIGIN, success_message())).expect("should settle");
    assert_eq!(result.data().map(|d| d.token.as_str()), Some("popup-token"));
}

#[test]
fn error_message_settles_with_error() {
    let mut settle = PopupSettle::new(ORIGIN);
    let data = serde_json::json!({ "type": "GOOGLE_AUTH_ERROR", "error": "Google authentication failed: access_denied" });
    let result = settle.handle(message(ORIGIN, data)).expect("should settle");
    assert_eq!(result.error(), Some("Google authentication failed: access_denied"));
}

#[test]
fn settles_exactly_once() {
    let mut settle = PopupSettle::new(ORIGIN);
    assert!(settle.handle(message(ORIGIN, success_message())).is_some());
    assert!(settle.handle(PopupEvent::Poll { closed: true }).is_none());
    assert!(settle.handle(message(ORIGIN, success_message())).is_none());
}

// =============================================================
// await_popup_result
// =============================================================

#[test]
fn popup_closed_before_message_resolves_cancelled() {
    let events = stream::iter(vec![
        PopupEvent::Poll { closed: false },
        PopupEvent::Poll { closed: true },
        message(ORIGIN, success_message()),
    ]);
    let result = block_on(await_popup_result(events, ORIGIN));
    assert_eq!(result, AuthEnvelope::err("Authentication cancelled by user"));
}

#[test]
fn message_before_close_wins() {
    let events = stream::iter(vec![
        PopupEvent::Poll { closed: false },
        message("https://evil.example", serde_json::json!({ "type": "GOOGLE_AUTH_ERROR", "error": "spoofed" })),
        message(ORIGIN, success_message()),
        PopupEvent::Poll { closed: true },
    ]);
    let result = block_on(await_popup_result(events, ORIGIN));
    assert!(result.is_success());
}

#[test]
fn exhausted_stream_resolves_cancelled() {
    let events = stream::iter(vec![PopupEvent::Poll { closed: false }]);
    let result = block_on(await_popup_result(events, ORIGIN));
    assert_eq!(result.error(), Some("Authentication cancelled by user"));
}

// =============================================================
// popup_features
// =============================================================

#[test]
fn popup_features_centers_fixed_size_window() {
    assert_eq!(
        popup_features(1500.0, 1000.0),
        "width=500,height=600,left=500,top=200,scrollbars=yes,resizable=yes"
    );
}

#[test]
fn popup_features_clamps_small_openers() {
    assert_eq!(popup_features(0.0, 0.0), "width=500,height=600,left=0,top=0,scrollbars=yes,resizable=yes");
}
