//! Thin `window` helpers for URL and cross-window plumbing.
//!
//! All of these are browser-only; SSR and test builds get no-op stand-ins so
//! callers need no `cfg` of their own.

/// The full current URL, if running in a browser.
pub fn current_href() -> Option<String> {
    #[cfg(feature = "hydrate")]
    {
        web_sys::window()?.location().href().ok()
    }
    #[cfg(not(feature = "hydrate"))]
    {
        None
    }
}

/// Replace the visible URL in place (no new history entry).
pub fn replace_url(url: &str) {
    #[cfg(feature = "hydrate")]
    {
        let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
            return;
        };
        if let Err(e) = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(url)) {
            log::warn!("history.replaceState failed: {e:?}");
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = url;
    }
}

/// Whether this window was opened by another window (popup mode).
pub fn has_opener() -> bool {
    #[cfg(feature = "hydrate")]
    {
        web_sys::window()
            .and_then(|w| w.opener().ok())
            .is_some_and(|opener| !opener.is_null() && !opener.is_undefined())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        false
    }
}

/// Post a JSON message to the opener, restricted to our own origin, then
/// close this window. Returns `false` if there is no opener to post to.
pub fn post_to_opener_and_close(message: &serde_json::Value) -> bool {
    #[cfg(feature = "hydrate")]
    {
        use wasm_bindgen::JsCast;

        let Some(window) = web_sys::window() else {
            return false;
        };
        let Some(opener) = window
            .opener()
            .ok()
            .filter(|o| !o.is_null() && !o.is_undefined())
            .and_then(|o| o.dyn_into::<web_sys::Window>().ok())
        else {
            return false;
        };
        let origin = window.location().origin().unwrap_or_default();
        let Ok(payload) = js_sys::JSON::parse(&message.to_string()) else {
            return false;
        };
        if let Err(e) = opener.post_message(&payload, &origin) {
            log::warn!("postMessage to opener failed: {e:?}");
        }
        let _ = window.close();
        true
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = message;
        false
    }
}
