//! Global redirect catcher.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mounted once beside the router. If the initial page load carries a token
//! in its URL (an external auth redirect that landed on an arbitrary route),
//! the session is persisted, the URL is scrubbed in place, and the user is
//! sent to the authenticated landing page.

#[cfg(test)]
#[path = "catcher_test.rs"]
mod catcher_test;

use leptos::prelude::*;

use super::capture::{UrlAuthParams, extract_auth_params, scrub_url};
use crate::config::AUTH_LANDING_PATH;
use crate::error::AuthError;
use crate::net::api::AuthApi;
use crate::net::transport::HttpTransport;
use crate::net::types::AuthData;
use crate::session::store::KeyValueStore;

#[derive(Clone, Debug, PartialEq)]
pub enum CaptureOutcome {
    /// The URL carried no token; nothing was persisted.
    NoToken,
    Captured(AuthData),
    /// A token was present but could not be persisted.
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaptureReport {
    /// Scrubbed relative URL to install with `history.replaceState`.
    pub clean_url: String,
    pub outcome: CaptureOutcome,
}

impl CaptureReport {
    /// Where to go next; `None` leaves the user on the current page.
    #[must_use]
    pub fn navigate_to(&self) -> Option<&'static str> {
        matches!(self.outcome, CaptureOutcome::Captured(_)).then_some(AUTH_LANDING_PATH)
    }
}

/// Persist a URL-delivered token, backfilling the profile when the URL did
/// not carry a usable `user` parameter.
///
/// A failed backfill keeps the token: a session without a cached profile is
/// tolerated and re-fetched later.
pub(crate) async fn persist_url_session<S, T>(
    api: &AuthApi<S, T>,
    token: String,
    params: &UrlAuthParams,
) -> Result<AuthData, AuthError>
where
    S: KeyValueStore,
    T: HttpTransport,
{
    let inline_user = params.inline_user();
    let data = AuthData { token, user: inline_user };
    api.store().save_auth_data(&data)?;
    if data.user.is_some() {
        return Ok(data);
    }

    match api.get_current_user().await.into_result() {
        Ok(user) => Ok(AuthData { user: Some(user), ..data }),
        Err(e) => {
            log::warn!("profile backfill after redirect failed: {e}");
            Ok(data)
        }
    }
}

/// Inspect `href` for a redirect-delivered session and persist it.
pub async fn capture_redirect<S, T>(api: &AuthApi<S, T>, href: &str) -> CaptureReport
where
    S: KeyValueStore,
    T: HttpTransport,
{
    let params = extract_auth_params(href);
    let clean_url = scrub_url(href);

    let Some(token) = params.token.clone() else {
        return CaptureReport { clean_url, outcome: CaptureOutcome::NoToken };
    };

    let outcome = match persist_url_session(api, token, &params).await {
        Ok(data) => {
            log::info!("captured session from redirect URL");
            CaptureOutcome::Captured(data)
        }
        Err(e) => {
            log::warn!("could not persist redirect session: {e}");
            CaptureOutcome::Failed(e.to_string())
        }
    };
    CaptureReport { clean_url, outcome }
}

/// Route-agnostic catcher for tokens arriving in the initial page URL.
#[component]
pub fn AuthRedirectCatcher() -> impl IntoView {
    #[cfg(feature = "hydrate")]
    {
        use leptos_router::NavigateOptions;
        use leptos_router::hooks::use_navigate;

        use crate::state::auth::AuthContext;
        use crate::util::browser;

        let auth = expect_context::<AuthContext>();
        let navigate = use_navigate();

        Effect::new(move || {
            let Some(href) = browser::current_href() else {
                return;
            };
            if extract_auth_params(&href).token.is_none() {
                return;
            }
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                let api = crate::net::api::browser_api();
                let report = capture_redirect(&api, &href).await;
                browser::replace_url(&report.clean_url);
                if let Some(path) = report.navigate_to() {
                    auth.sync_from_store();
                    navigate(path, NavigateOptions { replace: true, ..NavigateOptions::default() });
                }
            });
        });
    }

    ()
}
