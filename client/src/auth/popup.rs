//! Popup-window Google sign-in.
//!
//! The opener opens a sized popup on the backend's OAuth entry point. The
//! popup eventually lands on the callback route, which posts a
//! `PopupMessage` back and closes itself. The opener resolves on whichever
//! comes first: a same-origin message, or the popup being seen closed by the
//! poll timer.
//!
//! DESIGN
//! ======
//! Both event sources feed one channel, and `PopupSettle` accepts exactly one
//! terminal event. The listener and the interval are torn down once it
//! settles.

#[cfg(test)]
#[path = "popup_test.rs"]
mod popup_test;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::net::types::{AuthData, AuthEnvelope};

pub const POPUP_NAME: &str = "googleAuth";
pub const POPUP_WIDTH: u32 = 500;
pub const POPUP_HEIGHT: u32 = 600;
pub const POPUP_POLL_INTERVAL_MS: u32 = 500;

/// Message the callback popup posts to its opener.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PopupMessage {
    #[serde(rename = "GOOGLE_AUTH_SUCCESS")]
    Success {
        #[serde(rename = "authData")]
        auth_data: AuthData,
    },
    #[serde(rename = "GOOGLE_AUTH_ERROR")]
    Error { error: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum PopupEvent {
    /// A `message` event received by the opener window.
    Message { origin: String, data: serde_json::Value },
    /// A poll of the popup's `closed` flag.
    Poll { closed: bool },
}

/// Settle-once resolution of a popup sign-in.
#[derive(Debug)]
pub struct PopupSettle {
    expected_origin: String,
    settled: bool,
}

impl PopupSettle {
    pub fn new(expected_origin: impl Into<String>) -> Self {
        Self { expected_origin: expected_origin.into(), settled: false }
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Feed one event. Returns the result the first time an event is terminal,
    /// `None` for non-terminal events and for everything after settling.
    pub fn handle(&mut self, event: PopupEvent) -> Option<AuthEnvelope<AuthData>> {
        if self.settled {
            return None;
        }
        let result = match event {
            PopupEvent::Message { origin, data } => {
                if origin != self.expected_origin {
                    log::debug!("ignoring popup message from foreign origin {origin}");
                    return None;
                }
                match serde_json::from_value::<PopupMessage>(data) {
                    Ok(PopupMessage::Success { auth_data }) => AuthEnvelope::ok(auth_data),
                    Ok(PopupMessage::Error { error }) => AuthEnvelope::err(error),
                    Err(_) => return None,
                }
            }
            PopupEvent::Poll { closed: true } => AuthEnvelope::err(AuthError::PopupCancelled.to_string()),
            PopupEvent::Poll { closed: false } => return None,
        };
        self.settled = true;
        Some(result)
    }
}

/// Drive `events` until the popup flow settles. A stream that ends first
/// counts as the user abandoning the popup.
pub async fn await_popup_result<E>(mut events: E, expected_origin: &str) -> AuthEnvelope<AuthData>
where
    E: Stream<Item = PopupEvent> + Unpin,
{
    let mut settle = PopupSettle::new(expected_origin);
    while let Some(event) = events.next().await {
        if let Some(result) = settle.handle(event) {
            return result;
        }
    }
    AuthEnvelope::err(AuthError::PopupCancelled.to_string())
}

/// `window.open` feature string for a popup centered in the opener.
#[must_use]
pub fn popup_features(outer_width: f64, outer_height: f64) -> String {
    let left = ((outer_width - f64::from(POPUP_WIDTH)) / 2.0).max(0.0).round();
    let top = ((outer_height - f64::from(POPUP_HEIGHT)) / 2.0).max(0.0).round();
    format!("width={POPUP_WIDTH},height={POPUP_HEIGHT},left={left},top={top},scrollbars=yes,resizable=yes")
}

/// Run the Google sign-in in a popup and persist the session on success.
#[cfg(feature = "hydrate")]
pub async fn login_with_google_popup<S, T>(api: &crate::net::api::AuthApi<S, T>) -> AuthEnvelope<AuthData>
where
    S: crate::session::store::KeyValueStore,
    T: crate::net::transport::HttpTransport,
{
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    let Some(window) = web_sys::window() else {
        return AuthEnvelope::err(AuthError::Unavailable.to_string());
    };
    let origin = window.location().origin().unwrap_or_default();
    let features = popup_features(
        window.outer_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
        window.outer_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
    );

    let popup = match window.open_with_url_and_target_and_features(&api.google_auth_url(), POPUP_NAME, &features) {
        Ok(Some(popup)) => popup,
        _ => return AuthEnvelope::err(AuthError::PopupBlocked.to_string()),
    };

    let (tx, rx) = futures::channel::mpsc::unbounded::<PopupEvent>();

    let message_tx = tx.clone();
    let on_message = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(move |ev: web_sys::MessageEvent| {
        let data = js_sys::JSON::stringify(&ev.data())
            .ok()
            .and_then(|raw| raw.as_string())
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or(serde_json::Value::Null);
        let _ = message_tx.unbounded_send(PopupEvent::Message { origin: ev.origin(), data });
    });
    if let Err(e) = window.add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref()) {
        log::warn!("could not listen for popup messages, only closing the popup will settle: {e:?}");
    }

    let watched = popup.clone();
    let poll = gloo_timers::callback::Interval::new(POPUP_POLL_INTERVAL_MS, move || {
        let closed = watched.closed().unwrap_or(true);
        let _ = tx.unbounded_send(PopupEvent::Poll { closed });
    });

    let result = await_popup_result(rx, &origin).await;

    drop(poll);
    let _ = window.remove_event_listener_with_callback("message", on_message.as_ref().unchecked_ref());
    drop(on_message);
    if !popup.closed().unwrap_or(true) {
        let _ = popup.close();
    }

    if let Some(data) = result.data() {
        if let Err(e) = api.store().save_auth_data(data) {
            return AuthEnvelope::err(e.to_string());
        }
        log::info!("popup sign-in completed");
    }
    result
}
