//! Entry points that turn an external sign-in into a local session.
//!
//! SYSTEM CONTEXT
//! ==============
//! OAuth providers may land the user on any route (`catcher`) or on the
//! dedicated callback route (`callback`); `popup` covers the in-page flow.
//! `capture` holds the URL parsing all three share.

pub mod callback;
pub mod capture;
pub mod catcher;
pub mod popup;
