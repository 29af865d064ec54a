//! Client-side auth error taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! Nothing in the session layer surfaces these as panics. API calls fold them
//! into an `AuthEnvelope`, so the `Display` text of each variant is exactly the
//! `error` string a form banner shows.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Failure modes of the auth/session layer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The request never produced a response (offline, CORS, DNS).
    #[error("Network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },
    /// The response body was not the JSON shape we expected.
    #[error("Invalid server response: {0}")]
    Decode(String),
    /// Browser storage rejected a write (quota, private mode).
    #[error("Storage error: {0}")]
    Storage(String),
    /// The bearer token is not a decodable JWT with an `exp` claim.
    #[error("Malformed token: {0}")]
    MalformedToken(String),
    #[error("Popup blocked. Please allow popups for this site.")]
    PopupBlocked,
    #[error("Authentication cancelled by user")]
    PopupCancelled,
    /// The OAuth provider redirected back with an `error` parameter.
    #[error("Google authentication failed: {0}")]
    Provider(String),
    #[error("No authorization code received")]
    MissingCode,
    /// Browser-only functionality invoked outside the browser.
    #[error("not available on server")]
    Unavailable,
}

impl AuthError {
    /// Build an HTTP error, preferring the backend's own message when it sent one.
    pub(crate) fn http(status: u16, body: &serde_json::Value) -> Self {
        let message = ["message", "error"]
            .iter()
            .find_map(|key| body.get(key).and_then(serde_json::Value::as_str).filter(|msg| !msg.trim().is_empty()))
            .map_or_else(|| format!("Request failed with status {status}"), str::to_owned);
        Self::Http { status, message }
    }
}
