//! Protected landing page for a signed-in user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything here sits behind `RequireAuth`. The page only reads the cached
//! profile; refreshing it is left to the flows that create the session.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::config::LOGIN_PATH;
use crate::net::types::UserProfile;
use crate::state::auth::AuthContext;
use crate::util::auth::RequireAuth;

/// Greeting name: the profile name, falling back to the email address.
pub fn display_name(user: &UserProfile) -> String {
    let name = user.name.trim();
    if name.is_empty() { user.email.clone() } else { name.to_owned() }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    view! {
        <RequireAuth>
            <DashboardContent/>
        </RequireAuth>
    }
}

#[component]
fn DashboardContent() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let navigate = use_navigate();
    let notice = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    Effect::new(move || {
        if let Some(message) = crate::session::store::TokenStore::browser().take_post_auth_message() {
            notice.set(Some(message));
        }
    });

    let on_logout = move |_| {
        if busy.get_untracked() {
            return;
        }
        busy.set(true);

        #[cfg(feature = "hydrate")]
        {
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                let api = crate::net::api::browser_api();
                if let Some(e) = api.logout().await.error() {
                    log::warn!("logout request failed: {e}");
                }
                auth.logout();
                busy.set(false);
                navigate(LOGIN_PATH, NavigateOptions { replace: true, ..NavigateOptions::default() });
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            auth.logout();
            busy.set(false);
            navigate(LOGIN_PATH, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    };

    let greeting = move || auth.user().map_or_else(|| "Welcome back".to_owned(), |u| format!("Welcome back, {}", display_name(&u)));
    let email = move || auth.user().map(|u| u.email).unwrap_or_default();
    let role = move || auth.user().and_then(|u| u.role().map(str::to_owned));

    view! {
        <div class="dashboard-page">
            <header class="dashboard-header">
                <h1>{greeting}</h1>
                <button class="dashboard-logout" on:click=on_logout disabled=move || busy.get()>
                    "Log out"
                </button>
            </header>
            <Show when=move || notice.get().is_some()>
                <p class="dashboard-notice">{move || notice.get().unwrap_or_default()}</p>
            </Show>
            <dl class="dashboard-profile">
                <dt>"Email"</dt>
                <dd>{email}</dd>
                <Show when=move || role().is_some()>
                    <dt>"Role"</dt>
                    <dd>{move || role().unwrap_or_default()}</dd>
                </Show>
            </dl>
        </div>
    }
}
