//! Shared fixtures for unit tests: JWT builders, a sample profile, and a
//! scripted HTTP transport that records what it was asked to send.

use std::cell::RefCell;
use std::collections::VecDeque;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::config::ApiConfig;
use crate::error::AuthError;
use crate::net::api::AuthApi;
use crate::net::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::net::types::UserProfile;
use crate::session::store::{MemoryStore, TokenStore};

pub const NOW: f64 = 1_700_000_000.0;

/// Unsigned JWT-shaped token with the given `exp` claim.
pub fn token_with_exp(exp: f64) -> String {
    token_with_payload(&serde_json::json!({ "sub": "u-1", "exp": exp }))
}

pub fn token_with_payload(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}

/// A token that stays valid for the lifetime of the test run.
pub fn live_token() -> String {
    token_with_exp(4_000_000_000.0)
}

pub fn sample_user_json() -> serde_json::Value {
    serde_json::json!({
        "id": 7,
        "name": "Riley Promoter",
        "phone_number": "+1 555 0199",
        "email": "riley@example.com",
        "created_at": "2024-05-01T12:00:00Z",
        "updated_at": "2024-05-02T12:00:00Z",
        "profile_photo": null,
        "role": "admin"
    })
}

pub fn sample_user() -> UserProfile {
    serde_json::from_value(sample_user_json()).expect("sample user should parse")
}

/// Transport that replays queued responses in order and records requests.
#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, AuthError>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: serde_json::Value) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(HttpResponse { status, body: body.to_string() }));
        self
    }

    pub fn respond_raw(self, status: u16, body: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(HttpResponse { status, body: body.to_owned() }));
        self
    }

    pub fn fail(self, error: AuthError) -> Self {
        self.responses.borrow_mut().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    /// Number of requests whose URL ends with `path`.
    pub fn calls_to(&self, path: &str) -> usize {
        self.requests.borrow().iter().filter(|r| r.url.ends_with(path)).count()
    }
}

#[async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AuthError> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::Network("no scripted response".to_owned())))
    }
}

pub fn api_with(transport: MockTransport) -> AuthApi<MemoryStore, MockTransport> {
    AuthApi::new(ApiConfig::new("https://api.example.com"), TokenStore::new(MemoryStore::new()), transport)
}
