//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by domain so components can depend on small focused models.
//! Only the auth session is tab-wide today.

pub mod auth;
