//! Persistent token + profile storage.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser's `localStorage` is the only place a session survives a reload.
//! `TokenStore` owns the key layout; everything else goes through it so the
//! token and the cached profile are created and destroyed together.
//!
//! TRADE-OFFS
//! ==========
//! Reads are best-effort: a missing window, a denied storage handle, or a
//! corrupted value all read as "absent" rather than as an error.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::AuthError;
use crate::net::types::{AuthData, UserProfile};

pub const TOKEN_KEY: &str = "token";
pub const USER_PROFILE_KEY: &str = "userProfile";
pub const POST_AUTH_MESSAGE_KEY: &str = "postAuthMessage";

/// String key-value storage with `localStorage` semantics.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns `AuthError::Storage` (or `Unavailable`) when the write is rejected.
    fn set(&self, key: &str, value: &str) -> Result<(), AuthError>;

    fn remove(&self, key: &str);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }
}

/// `window.localStorage`. Outside the browser reads are empty and writes fail.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStore;

#[cfg(feature = "hydrate")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        #[cfg(feature = "hydrate")]
        {
            local_storage()?.get_item(key).ok().flatten()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            None
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        #[cfg(feature = "hydrate")]
        {
            let storage = local_storage().ok_or_else(|| AuthError::Storage("localStorage unavailable".to_owned()))?;
            storage
                .set_item(key, value)
                .map_err(|e| AuthError::Storage(format!("{e:?}")))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (key, value);
            Err(AuthError::Unavailable)
        }
    }

    fn remove(&self, key: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(storage) = local_storage() {
                let _ = storage.remove_item(key);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
        }
    }
}

/// In-process store for tests and non-browser callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// Typed view over a `KeyValueStore` holding the session.
#[derive(Clone, Debug, Default)]
pub struct TokenStore<S> {
    inner: S,
}

impl TokenStore<BrowserStore> {
    #[must_use]
    pub fn browser() -> Self {
        Self::new(BrowserStore)
    }
}

impl<S: KeyValueStore> TokenStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// The underlying key-value store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Persist the token and the profile that came with it. Without a profile
    /// any previously cached one is dropped, since it belonged to another token.
    ///
    /// All or nothing: if the profile write is rejected the token is removed
    /// again, so a failed save never leaves a live session behind.
    ///
    /// # Errors
    ///
    /// Returns the storage error if either write is rejected.
    pub fn save_auth_data(&self, data: &AuthData) -> Result<(), AuthError> {
        self.inner.set(TOKEN_KEY, &data.token)?;
        match &data.user {
            Some(user) => {
                if let Err(e) = self.set_user_profile(user) {
                    log::warn!("profile write rejected, discarding new session: {e}");
                    self.clear();
                    return Err(e);
                }
            }
            None => self.inner.remove(USER_PROFILE_KEY),
        }
        Ok(())
    }

    pub fn get_auth_token(&self) -> Option<String> {
        self.inner.get(TOKEN_KEY).filter(|token| !token.trim().is_empty())
    }

    pub fn get_user_profile(&self) -> Option<UserProfile> {
        let raw = self.inner.get(USER_PROFILE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("ignoring unreadable cached profile: {e}");
                None
            }
        }
    }

    /// Replace the cached profile, leaving the token as is.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the write is rejected.
    pub fn set_user_profile(&self, user: &UserProfile) -> Result<(), AuthError> {
        let raw = serde_json::to_string(user).map_err(|e| AuthError::Storage(e.to_string()))?;
        self.inner.set(USER_PROFILE_KEY, &raw)
    }

    /// Drop the token and the cached profile together.
    pub fn clear(&self) {
        self.inner.remove(TOKEN_KEY);
        self.inner.remove(USER_PROFILE_KEY);
    }

    /// # Errors
    ///
    /// Returns the storage error if the write is rejected.
    pub fn set_post_auth_message(&self, message: &str) -> Result<(), AuthError> {
        self.inner.set(POST_AUTH_MESSAGE_KEY, message)
    }

    /// Read the one-shot banner and remove it.
    pub fn take_post_auth_message(&self) -> Option<String> {
        let message = self.inner.get(POST_AUTH_MESSAGE_KEY)?;
        self.inner.remove(POST_AUTH_MESSAGE_KEY);
        Some(message).filter(|m| !m.is_empty())
    }
}
