//! Login page: email + password, or Google via popup.
//!
//! SYSTEM CONTEXT
//! ==============
//! Both flows persist the session through `AuthApi` and then update the
//! shared `AuthContext`. A message left by a failed OAuth callback is shown
//! once on mount.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::config::AUTH_LANDING_PATH;
use crate::state::auth::AuthContext;

/// Trim and check the form fields before any request is made.
pub fn validate_login_input(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err("Enter both email and password.");
    }
    if !email.contains('@') {
        return Err("Enter a valid email address.");
    }
    Ok((email.to_owned(), password.to_owned()))
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let navigate = use_navigate();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(None::<String>);
    let notice = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    // Already signed in: skip the form.
    let navigate_home = navigate.clone();
    Effect::new(move || {
        let state = auth.state.get();
        if !state.loading && state.is_authenticated {
            navigate_home(AUTH_LANDING_PATH, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    Effect::new(move || {
        if let Some(message) = crate::session::store::TokenStore::browser().take_post_auth_message() {
            notice.set(Some(message));
        }
    });

    let navigate_submit = navigate.clone();
    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let (email_value, password_value) = match validate_login_input(&email.get_untracked(), &password.get_untracked()) {
            Ok(fields) => fields,
            Err(message) => {
                error.set(Some(message.to_owned()));
                return;
            }
        };
        error.set(None);
        busy.set(true);

        #[cfg(feature = "hydrate")]
        {
            let navigate = navigate_submit.clone();
            leptos::task::spawn_local(async move {
                let api = crate::net::api::browser_api();
                let request = crate::net::types::LoginRequest { email: email_value, password: password_value };
                let outcome = api.login(&request).await.into_result().and_then(|data| auth.login(data).map_err(|e| e.to_string()));
                busy.set(false);
                match outcome {
                    Ok(()) => navigate(AUTH_LANDING_PATH, NavigateOptions::default()),
                    Err(message) => error.set(Some(message)),
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (email_value, password_value, &navigate_submit);
            busy.set(false);
        }
    };

    let on_google = move |_| {
        if busy.get_untracked() {
            return;
        }
        error.set(None);
        busy.set(true);

        #[cfg(feature = "hydrate")]
        {
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                let api = crate::net::api::browser_api();
                let outcome = crate::auth::popup::login_with_google_popup(&api).await;
                busy.set(false);
                match outcome.into_result() {
                    Ok(_) => {
                        auth.sync_from_store();
                        navigate(AUTH_LANDING_PATH, NavigateOptions::default());
                    }
                    Err(message) => error.set(Some(message)),
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = &navigate;
            busy.set(false);
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Sign in"</h1>
                <Show when=move || notice.get().is_some()>
                    <p class="login-message login-message--notice">{move || notice.get().unwrap_or_default()}</p>
                </Show>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign In"
                    </button>
                </form>
                <Show when=move || error.get().is_some()>
                    <p class="login-message login-message--error">{move || error.get().unwrap_or_default()}</p>
                </Show>
                <div class="login-divider"></div>
                <button class="login-button login-button--google" on:click=on_google disabled=move || busy.get()>
                    "Sign in with Google"
                </button>
            </div>
        </div>
    }
}
