//! Networking modules for the REST auth API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` wraps each endpoint in an `AuthEnvelope`, `transport` is the fetch
//! seam, and `types` defines the wire schema.

pub mod api;
pub mod transport;
pub mod types;
