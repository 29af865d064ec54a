//! Route guard for protected pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected routes apply identical unauthenticated redirect behavior. The
//! check runs against the stored session when the guard is evaluated; a
//! session that changes afterwards is only noticed on the next navigation.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::config::LOGIN_PATH;
use crate::session::resolver;
use crate::session::store::TokenStore;
use crate::state::auth::{AuthContext, AuthState};

/// Where to send the user, if anywhere. Nothing happens until auth has loaded.
pub fn guard_redirect(state: &AuthState, session_valid: bool) -> Option<&'static str> {
    if state.loading {
        return None;
    }
    (!(state.is_authenticated && session_valid)).then_some(LOGIN_PATH)
}

/// Redirect to `/login` once auth has loaded and no valid session exists.
pub fn install_unauth_redirect<F>(auth: AuthContext, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        let state = auth.state.get();
        let session_valid = !state.loading && resolver::is_authenticated(&TokenStore::browser());
        if let Some(path) = guard_redirect(&state, session_valid) {
            navigate(path, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}

/// Renders `children` only for an authenticated session.
#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    install_unauth_redirect(auth, use_navigate());

    view! {
        <Show when=move || auth.state.with(|s| !s.loading && s.is_authenticated)>
            {children()}
        </Show>
    }
}
