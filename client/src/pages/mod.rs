//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration. The OAuth callback page lives
//! with the rest of the redirect handling in `auth::callback`.

pub mod dashboard;
pub mod home;
pub mod login;
