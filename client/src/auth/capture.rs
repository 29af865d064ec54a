//! Auth parameter extraction and scrubbing for redirect URLs.
//!
//! After an external sign-in the backend lands the browser on some route
//! with the session in the URL, either in the query (`?token=...`) or in the
//! fragment (`#access_token=...`, or a hash route like `#/x?jwt=...`). These
//! helpers read those parameters and produce the same URL without them, for
//! `history.replaceState`.

#[cfg(test)]
#[path = "capture_test.rs"]
mod capture_test;

use url::Url;
use url::form_urlencoded;

use crate::net::types::UserProfile;

/// Accepted names for the bearer token, in priority order.
pub const TOKEN_PARAMS: [&str; 3] = ["token", "access_token", "jwt"];

/// Parameters that must not survive in the visible URL.
const SENSITIVE_PARAMS: [&str; 11] = [
    "token",
    "access_token",
    "jwt",
    "user",
    "auth",
    "code",
    "state",
    "error",
    "scope",
    "authuser",
    "prompt",
];

/// Auth-related parameters found in a URL. Empty values count as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlAuthParams {
    pub token: Option<String>,
    /// Raw (already percent-decoded) JSON text of the `user` parameter.
    pub user: Option<String>,
    pub auth: Option<String>,
    pub code: Option<String>,
    pub error: Option<String>,
}

impl UrlAuthParams {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The inline `user` parameter as a profile, if it is present and is a
    /// JSON object. Missing profile fields (including `id`) read as empty.
    #[must_use]
    pub fn inline_user(&self) -> Option<UserProfile> {
        let raw = self.user.as_deref()?;
        match serde_json::from_str(raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("ignoring inline user parameter that is not a JSON object: {e}");
                None
            }
        }
    }
}

/// Split a fragment into its route prefix and its parameter string.
fn split_fragment(fragment: &str) -> (&str, &str) {
    if let Some((route, params)) = fragment.split_once('?') {
        (route, params)
    } else if fragment.contains('=') {
        ("", fragment)
    } else {
        (fragment, "")
    }
}

fn pairs(params: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(params.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn lookup(sources: &[Vec<(String, String)>], names: &[&str]) -> Option<String> {
    sources.iter().find_map(|source| {
        names.iter().find_map(|name| {
            source
                .iter()
                .find(|(key, value)| key == name && !value.is_empty())
                .map(|(_, value)| value.clone())
        })
    })
}

/// Read auth parameters from the query string, then the fragment.
#[must_use]
pub fn extract_auth_params(href: &str) -> UrlAuthParams {
    let Ok(url) = Url::parse(href) else {
        return UrlAuthParams::default();
    };
    let query = pairs(url.query().unwrap_or_default());
    let fragment = pairs(split_fragment(url.fragment().unwrap_or_default()).1);
    let sources = [query, fragment];

    UrlAuthParams {
        token: lookup(&sources, &TOKEN_PARAMS),
        user: lookup(&sources, &["user"]),
        auth: lookup(&sources, &["auth"]),
        code: lookup(&sources, &["code"]),
        error: lookup(&sources, &["error"]),
    }
}

fn strip_sensitive(params: &str) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs(params) {
        if !SENSITIVE_PARAMS.contains(&key.as_str()) {
            out.append_pair(&key, &value);
        }
    }
    out.finish()
}

/// The same-origin relative URL (`path?query#fragment`) with every auth
/// parameter removed. Empty query/fragment sections are dropped.
#[must_use]
pub fn scrub_url(href: &str) -> String {
    let Ok(url) = Url::parse(href) else {
        return href.to_owned();
    };

    let mut out = url.path().to_owned();

    let query = strip_sensitive(url.query().unwrap_or_default());
    if !query.is_empty() {
        out.push('?');
        out.push_str(&query);
    }

    let (route, params) = split_fragment(url.fragment().unwrap_or_default());
    let params = strip_sensitive(params);
    let fragment = match (route.is_empty(), params.is_empty()) {
        (_, true) => route.to_owned(),
        (true, false) => params,
        (false, false) => format!("{route}?{params}"),
    };
    if !fragment.is_empty() {
        out.push('#');
        out.push_str(&fragment);
    }
    out
}
