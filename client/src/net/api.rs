//! REST auth API client.
//!
//! Every operation performs exactly one request through the `HttpTransport`
//! seam and folds the outcome into an `AuthEnvelope`. Nothing here panics or
//! retries; network, HTTP and decode failures all come back as
//! `{success: false, error}` for the caller to render.
//!
//! ERROR HANDLING
//! ==============
//! `logout` clears the local session before reporting, whatever the server
//! said. A stale remote session is preferable to a stuck local one.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::transport::{BrowserTransport, HttpRequest, HttpTransport, Method};
use super::types::{
    AuthData, AuthEnvelope, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, ProfileUpdate,
    RegisterRequest, ResetPasswordRequest, UserPayload, UserProfile,
};
use crate::config::ApiConfig;
use crate::error::AuthError;
use crate::session::store::{BrowserStore, KeyValueStore, TokenStore};

pub const LOGIN_PATH: &str = "/users/login";
pub const REGISTER_PATH: &str = "/users/registerAdmin";
pub const CURRENT_USER_PATH: &str = "/users/auth/me";
pub const PROFILE_PATH: &str = "/users/auth/profile";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const CHANGE_PASSWORD_PATH: &str = "/auth/change-password";
pub const PASSWORD_RESET_REQUEST_PATH: &str = "/password-reset/request";
pub const PASSWORD_RESET_VERIFY_PATH: &str = "/password-reset/verify";
pub const VALIDATE_TOKEN_PATH: &str = "/validate-token";
pub const GOOGLE_AUTH_PATH: &str = "/auth/google";
pub const GOOGLE_CALLBACK_PATH: &str = "/auth/google/callback";
pub const GOOGLE_TEST_CONFIG_PATH: &str = "/auth/test-config";

/// Auth API client bound to a token store and a transport.
pub struct AuthApi<S, T> {
    config: ApiConfig,
    store: TokenStore<S>,
    transport: T,
}

/// The client the running app uses: `localStorage` + `fetch`.
pub type BrowserAuthApi = AuthApi<BrowserStore, BrowserTransport>;

#[must_use]
pub fn browser_api() -> BrowserAuthApi {
    AuthApi::new(ApiConfig::from_build_env(), TokenStore::browser(), BrowserTransport)
}

#[derive(Deserialize)]
struct RegisterResponse {
    #[serde(default, alias = "access_token")]
    token: Option<String>,
    #[serde(default)]
    user: Option<UserProfile>,
}

#[derive(Serialize)]
struct CodeExchangeRequest<'a> {
    code: &'a str,
}

impl<S: KeyValueStore, T: HttpTransport> AuthApi<S, T> {
    pub fn new(config: ApiConfig, store: TokenStore<S>, transport: T) -> Self {
        Self { config, store, transport }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn store(&self) -> &TokenStore<S> {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `POST /users/registerAdmin`. Starts a session only if the response carries a token.
    ///
    /// The created profile is `None` when the backend answered with a bare
    /// `{ "token": ... }`; the session is still persisted in that case.
    pub async fn register(&self, request: &RegisterRequest) -> AuthEnvelope<Option<UserProfile>> {
        self.register_inner(request).await.into()
    }

    async fn register_inner(&self, request: &RegisterRequest) -> Result<Option<UserProfile>, AuthError> {
        let payload = self.call(Method::Post, REGISTER_PATH, Some(encode(request)?)).await?;
        let parsed: RegisterResponse = decode(payload.clone())?;
        let user = match (parsed.user, &parsed.token) {
            (Some(user), _) => Some(user),
            (None, Some(_)) => None,
            (None, None) => Some(decode::<UserPayload>(payload)?.into_profile()),
        };
        if let Some(token) = parsed.token {
            self.store.save_auth_data(&AuthData { token, user: user.clone() })?;
            log::info!("registration returned a session; signed in");
        }
        Ok(user)
    }

    /// `POST /users/login`; persists token + profile on success.
    pub async fn login(&self, request: &LoginRequest) -> AuthEnvelope<AuthData> {
        let body = match encode(request) {
            Ok(body) => body,
            Err(e) => return AuthEnvelope::err(e.to_string()),
        };
        self.authenticate(LOGIN_PATH, body).await.into()
    }

    /// `POST /auth/logout`. The local session is cleared even if the call fails.
    pub async fn logout(&self) -> AuthEnvelope<()> {
        let result = self.call(Method::Post, LOGOUT_PATH, None).await.map(|_| ());
        self.store.clear();
        if let Err(e) = &result {
            log::warn!("remote logout failed, local session cleared anyway: {e}");
        }
        result.into()
    }

    /// `GET /users/auth/me`; refreshes the cached profile.
    pub async fn get_current_user(&self) -> AuthEnvelope<UserProfile> {
        self.fetch_profile(Method::Get, CURRENT_USER_PATH, None).await.into()
    }

    /// `PUT /users/auth/profile`; refreshes the cached profile, keeps the token.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> AuthEnvelope<UserProfile> {
        let result = match encode(update) {
            Ok(body) => self.fetch_profile(Method::Put, PROFILE_PATH, Some(body)).await,
            Err(e) => Err(e),
        };
        result.into()
    }

    /// `POST /auth/change-password`.
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> AuthEnvelope<()> {
        self.send_unit(CHANGE_PASSWORD_PATH, encode(request)).await.into()
    }

    /// `POST /password-reset/request`.
    pub async fn forgot_password(&self, email: &str) -> AuthEnvelope<()> {
        let request = ForgotPasswordRequest { email: email.trim().to_owned() };
        self.send_unit(PASSWORD_RESET_REQUEST_PATH, encode(&request)).await.into()
    }

    /// `POST /password-reset/verify`.
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> AuthEnvelope<()> {
        self.send_unit(PASSWORD_RESET_VERIFY_PATH, encode(request)).await.into()
    }

    /// `GET /validate-token`: ask the backend whether the stored token is still good.
    ///
    /// A non-2xx answer (or `{"valid": false}`) clears the local session and
    /// yields `false`. Transport failures are reported as errors and leave the
    /// session alone, since they say nothing about the token.
    pub async fn validate_token(&self) -> AuthEnvelope<bool> {
        match self.call(Method::Get, VALIDATE_TOKEN_PATH, None).await {
            Ok(payload) => {
                let valid = payload.get("valid").and_then(serde_json::Value::as_bool).unwrap_or(true);
                if !valid {
                    self.store.clear();
                }
                AuthEnvelope::ok(valid)
            }
            Err(AuthError::Http { status, .. }) => {
                log::info!("server rejected stored token ({status}); clearing session");
                self.store.clear();
                AuthEnvelope::ok(false)
            }
            Err(e) => AuthEnvelope::err(e.to_string()),
        }
    }

    /// `POST /auth/google/callback`: trade an OAuth authorization code for a session.
    pub async fn exchange_google_code(&self, code: &str) -> AuthEnvelope<AuthData> {
        let body = match encode(&CodeExchangeRequest { code }) {
            Ok(body) => body,
            Err(e) => return AuthEnvelope::err(e.to_string()),
        };
        self.authenticate(GOOGLE_CALLBACK_PATH, body).await.into()
    }

    /// `GET /auth/test-config`: backend OAuth configuration probe.
    pub async fn google_config(&self) -> AuthEnvelope<serde_json::Value> {
        self.call(Method::Get, GOOGLE_TEST_CONFIG_PATH, None).await.into()
    }

    /// Where the browser (or popup) goes to start Google sign-in.
    #[must_use]
    pub fn google_auth_url(&self) -> String {
        self.config.endpoint(GOOGLE_AUTH_PATH)
    }

    // =========================================================================
    // PLUMBING
    // =========================================================================

    async fn authenticate(&self, path: &str, body: String) -> Result<AuthData, AuthError> {
        let payload = self.call(Method::Post, path, Some(body)).await?;
        let data: AuthData = decode(payload)?;
        self.store.save_auth_data(&data)?;
        log::info!("session established via {path}");
        Ok(data)
    }

    async fn fetch_profile(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<UserProfile, AuthError> {
        let payload = self.call(method, path, body).await?;
        let user = decode::<UserPayload>(payload)?.into_profile();
        if let Err(e) = self.store.set_user_profile(&user) {
            log::warn!("could not cache profile: {e}");
        }
        Ok(user)
    }

    async fn send_unit(&self, path: &str, body: Result<String, AuthError>) -> Result<(), AuthError> {
        self.call(Method::Post, path, Some(body?)).await.map(|_| ())
    }

    fn build_request(&self, method: Method, path: &str, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("Accept".to_owned(), "application/json".to_owned())];
        if body.is_some() {
            headers.push(("Content-Type".to_owned(), "application/json".to_owned()));
        }
        if let Some(token) = self.store.get_auth_token() {
            headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
        }
        HttpRequest { method, url: self.config.endpoint(path), headers, body }
    }

    /// One round trip: non-2xx becomes `AuthError::Http`, the body is parsed
    /// as JSON and unwrapped from a `{ "data": ... }` wrapper if present.
    async fn call(&self, method: Method, path: &str, body: Option<String>) -> Result<serde_json::Value, AuthError> {
        let request = self.build_request(method, path, body);
        let resp = self.transport.send(request).await?;
        if !resp.is_ok() {
            let body = parse_body(&resp.body).unwrap_or(serde_json::Value::Null);
            let err = AuthError::http(resp.status, &body);
            log::warn!("{path} failed with status {}", resp.status);
            return Err(err);
        }
        parse_body(&resp.body).map(unwrap_data)
    }
}

fn encode<B: Serialize>(body: &B) -> Result<String, AuthError> {
    serde_json::to_string(body).map_err(|e| AuthError::Decode(e.to_string()))
}

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, AuthError> {
    serde_json::from_value(value).map_err(|e| AuthError::Decode(e.to_string()))
}

fn parse_body(raw: &str) -> Result<serde_json::Value, AuthError> {
    if raw.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(raw).map_err(|e| AuthError::Decode(e.to_string()))
}

fn unwrap_data(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
            map.remove("data").unwrap_or(serde_json::Value::Null)
        }
        other => other,
    }
}
