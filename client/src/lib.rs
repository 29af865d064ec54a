//! # client
//!
//! Leptos + WASM frontend for the event-ticketing platform.
//!
//! This crate holds the browser session layer (token store, session resolver,
//! REST auth client, redirect/OAuth capturers), the auth context and route
//! guard, and the handful of pages that exercise them. All persistence and
//! business rules live behind the REST API.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod net;
pub mod pages;
pub mod session;
pub mod state;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;

/// WASM entry point: hydrate the server-rendered shell.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
