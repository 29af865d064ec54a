//! Browser session layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! `store` owns the persisted token + profile; `resolver` decides from them
//! whether a session is currently valid. Neither touches the network.

pub mod resolver;
pub mod store;

pub use resolver::{is_authenticated, is_authenticated_at};
pub use store::{BrowserStore, KeyValueStore, MemoryStore, TokenStore};
