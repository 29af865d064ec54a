//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards and user-aware components to coordinate login
//! redirects and identity-dependent rendering. The state starts `loading` on
//! both server and client and is bootstrapped from local storage once the app
//! hydrates, so server and client render the same first frame.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;

use crate::error::AuthError;
use crate::net::types::{AuthData, UserProfile};
use crate::session::resolver;
use crate::session::store::{KeyValueStore, TokenStore};

/// Backend field names that have been seen carrying the account role.
const ROLE_FIELDS: [&str; 7] = ["role", "user_role", "userRole", "role_name", "roleName", "type", "user_type"];

#[derive(Clone, Debug, PartialEq)]
pub struct AuthState {
    pub loading: bool,
    pub is_authenticated: bool,
    pub user: Option<UserProfile>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { loading: true, is_authenticated: false, user: None }
    }
}

impl AuthState {
    /// Synchronous snapshot of the stored session. No network.
    pub fn from_store<S: KeyValueStore>(store: &TokenStore<S>) -> Self {
        let is_authenticated = resolver::is_authenticated(store);
        let user = if is_authenticated { store.get_user_profile() } else { None };
        Self { loading: false, is_authenticated, user }
    }

    /// Persist `data` and mark the session live. On a storage failure the
    /// in-memory state is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns the storage error from the token store.
    pub fn login<S: KeyValueStore>(&mut self, store: &TokenStore<S>, data: AuthData) -> Result<(), AuthError> {
        store.save_auth_data(&data)?;
        self.loading = false;
        self.is_authenticated = true;
        self.user = data.user.or_else(|| store.get_user_profile());
        Ok(())
    }

    pub fn logout<S: KeyValueStore>(&mut self, store: &TokenStore<S>) {
        store.clear();
        self.loading = false;
        self.is_authenticated = false;
        self.user = None;
    }

    /// Case-insensitive role check across the role field variants.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        let Some(user) = self.user.as_ref() else {
            return false;
        };
        ROLE_FIELDS
            .iter()
            .filter_map(|field| user.extra.get(*field))
            .any(|value| role_matches(value, role))
    }
}

fn role_matches(value: &serde_json::Value, role: &str) -> bool {
    match value {
        serde_json::Value::String(s) => s.trim().eq_ignore_ascii_case(role.trim()),
        serde_json::Value::Array(items) => items.iter().any(|item| role_matches(item, role)),
        serde_json::Value::Object(map) => map.get("name").is_some_and(|name| role_matches(name, role)),
        _ => false,
    }
}

/// Reactive handle to the tab-wide auth state, provided by `App`.
#[derive(Clone, Copy, Debug)]
pub struct AuthContext {
    pub state: RwSignal<AuthState>,
}

impl AuthContext {
    #[must_use]
    pub fn new() -> Self {
        Self { state: RwSignal::new(AuthState::default()) }
    }

    /// Compute the initial state from storage. Runs once at client mount.
    pub fn bootstrap(&self) {
        self.sync_from_store();
    }

    /// Re-read the session written by another flow (redirect capture, popup).
    pub fn sync_from_store(&self) {
        self.state.set(AuthState::from_store(&TokenStore::browser()));
    }

    /// # Errors
    ///
    /// Returns the storage error; the reactive state is unchanged in that case.
    pub fn login(&self, data: AuthData) -> Result<(), AuthError> {
        let store = TokenStore::browser();
        let mut next = self.state.get_untracked();
        next.login(&store, data)?;
        self.state.set(next);
        Ok(())
    }

    pub fn logout(&self) {
        let store = TokenStore::browser();
        self.state.update(|s| s.logout(&store));
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with(|s| s.is_authenticated)
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.with(|s| s.user.clone())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.state.with(|s| s.has_role(role))
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}
