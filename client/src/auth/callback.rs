//! Dedicated OAuth callback route.
//!
//! SYSTEM CONTEXT
//! ==============
//! The backend's Google flow ends here, either as a top-level redirect or
//! inside the popup opened by `popup::login_with_google_popup`. The session
//! arrives as an inline token or as an authorization code to exchange.

#[cfg(test)]
#[path = "callback_test.rs"]
mod callback_test;

use std::time::Duration;

use leptos::prelude::*;

use super::capture::extract_auth_params;
use super::catcher::persist_url_session;
use super::popup::PopupMessage;
use crate::error::AuthError;
use crate::net::api::AuthApi;
use crate::net::transport::HttpTransport;
use crate::net::types::AuthData;
use crate::session::store::{KeyValueStore, TokenStore};

/// How long a failed callback shows its error before going back to login.
pub const FAILURE_REDIRECT_DELAY: Duration = Duration::from_secs(3);

#[derive(Clone, Debug, PartialEq)]
pub enum CallbackOutcome {
    Authenticated(AuthData),
    Failed(String),
}

impl CallbackOutcome {
    /// The message a popup posts back to its opener.
    #[must_use]
    pub fn to_popup_message(&self) -> PopupMessage {
        match self {
            Self::Authenticated(data) => PopupMessage::Success { auth_data: data.clone() },
            Self::Failed(error) => PopupMessage::Error { error: error.clone() },
        }
    }
}

/// Resolve the callback URL into a persisted session.
///
/// Order: provider `error`, then an inline token, then a `code` exchange.
pub async fn complete_callback<S, T>(api: &AuthApi<S, T>, href: &str) -> CallbackOutcome
where
    S: KeyValueStore,
    T: HttpTransport,
{
    let params = extract_auth_params(href);

    let result = if let Some(error) = params.error.clone() {
        Err(AuthError::Provider(error).to_string())
    } else if let Some(token) = params.token.clone() {
        persist_url_session(api, token, &params).await.map_err(|e| e.to_string())
    } else if let Some(code) = params.code.as_deref() {
        api.exchange_google_code(code).await.into_result()
    } else {
        Err(AuthError::MissingCode.to_string())
    };

    match result {
        Ok(data) => {
            log::info!("OAuth callback completed");
            CallbackOutcome::Authenticated(data)
        }
        Err(error) => {
            log::warn!("OAuth callback failed: {error}");
            CallbackOutcome::Failed(error)
        }
    }
}

/// Leave `message` for the login page to show once. A rejected write is
/// logged; the redirect to login still happens.
pub(crate) fn leave_post_auth_message<S: KeyValueStore>(store: &TokenStore<S>, message: &str) -> bool {
    match store.set_post_auth_message(message) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("could not store post-auth message: {e}");
            false
        }
    }
}

/// `/auth/google/callback` page.
#[component]
pub fn GoogleCallbackPage() -> impl IntoView {
    let status = RwSignal::new("Completing sign-in...".to_owned());

    #[cfg(feature = "hydrate")]
    {
        use leptos_router::NavigateOptions;
        use leptos_router::hooks::use_navigate;

        use super::capture::scrub_url;
        use crate::config::{AUTH_LANDING_PATH, LOGIN_PATH};
        use crate::state::auth::AuthContext;
        use crate::util::browser;

        let auth = expect_context::<AuthContext>();
        let navigate = use_navigate();

        Effect::new(move || {
            let Some(href) = browser::current_href() else {
                return;
            };
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                let api = crate::net::api::browser_api();
                let outcome = complete_callback(&api, &href).await;
                browser::replace_url(&scrub_url(&href));

                if browser::has_opener() {
                    let message = serde_json::to_value(outcome.to_popup_message()).unwrap_or_default();
                    if browser::post_to_opener_and_close(&message) {
                        return;
                    }
                }

                let replace = NavigateOptions { replace: true, ..NavigateOptions::default() };
                match outcome {
                    CallbackOutcome::Authenticated(_) => {
                        auth.sync_from_store();
                        navigate(AUTH_LANDING_PATH, replace);
                    }
                    CallbackOutcome::Failed(error) => {
                        status.set(error.clone());
                        leave_post_auth_message(api.store(), &error);
                        gloo_timers::future::sleep(FAILURE_REDIRECT_DELAY).await;
                        navigate(LOGIN_PATH, replace);
                    }
                }
            });
        });
    }

    view! {
        <div class="auth-callback">
            <p class="auth-callback__status">{move || status.get()}</p>
        </div>
    }
}
