//! Local session validity check.
//!
//! A session exists when a token is stored and its `exp` claim is not in the
//! past. The signature is not verified here; the backend does that on every
//! request. Anything that does not decode counts as logged out and the stored
//! session is wiped.

#[cfg(test)]
#[path = "resolver_test.rs"]
mod resolver_test;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use super::store::{KeyValueStore, TokenStore};
use crate::error::AuthError;

/// Claims read from the token payload.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenClaims {
    /// Expiry as Unix seconds.
    pub exp: f64,
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// Decode the middle segment of a JWT-shaped token.
///
/// # Errors
///
/// Returns `AuthError::MalformedToken` if the token has no payload segment,
/// the segment is not base64 JSON, or `exp` is missing or not a number.
pub fn decode_claims(token: &str) -> Result<TokenClaims, AuthError> {
    let mut segments = token.split('.');
    let payload_segment = match (segments.next(), segments.next()) {
        (Some(_), Some(payload)) if !payload.is_empty() => payload,
        _ => return Err(AuthError::MalformedToken("expected header.payload.signature".to_owned())),
    };

    // Accept standard and URL-safe alphabets, padded or not.
    let normalized: String = payload_segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| AuthError::MalformedToken(e.to_string()))?;

    let payload: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&bytes).map_err(|e| AuthError::MalformedToken(e.to_string()))?;
    let exp = payload
        .get("exp")
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| AuthError::MalformedToken("missing numeric exp claim".to_owned()))?;

    Ok(TokenClaims { exp, payload })
}

/// Current wall-clock time in Unix seconds.
pub fn now_unix_secs() -> f64 {
    #[cfg(feature = "hydrate")]
    {
        js_sys::Date::now() / 1000.0
    }
    #[cfg(not(feature = "hydrate"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0.0, |d| d.as_secs_f64())
    }
}

/// Whether the stored token describes a live session right now.
pub fn is_authenticated<S: KeyValueStore>(store: &TokenStore<S>) -> bool {
    is_authenticated_at(store, now_unix_secs())
}

/// [`is_authenticated`] against an explicit clock.
///
/// Clears the stored token and profile when the token is expired or garbled.
pub fn is_authenticated_at<S: KeyValueStore>(store: &TokenStore<S>, now_secs: f64) -> bool {
    let Some(token) = store.get_auth_token() else {
        return false;
    };

    match decode_claims(&token) {
        Ok(claims) if claims.exp < now_secs => {
            log::info!("stored session expired; clearing");
            store.clear();
            false
        }
        Ok(_) => true,
        Err(e) => {
            log::debug!("stored token rejected: {e}");
            store.clear();
            false
        }
    }
}
