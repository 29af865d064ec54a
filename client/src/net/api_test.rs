use futures::executor::block_on;

use super::*;
use crate::net::types::AuthData;
use crate::testing::{MockTransport, api_with, live_token, sample_user, sample_user_json};

fn login_request() -> LoginRequest {
    LoginRequest { email: "riley@example.com".to_owned(), password: "hunter22".to_owned() }
}

fn seed_session<S: KeyValueStore, T: HttpTransport>(api: &AuthApi<S, T>, token: &str) {
    api.store()
        .save_auth_data(&AuthData { token: token.to_owned(), user: Some(sample_user()) })
        .expect("seed session");
}

// =============================================================
// login
// =============================================================

#[test]
fn login_persists_token_and_user() {
    let token = live_token();
    let api = api_with(MockTransport::new().respond(200, serde_json::json!({ "token": token, "user": sample_user_json() })));

    let env = block_on(api.login(&login_request()));

    assert!(env.is_success());
    assert_eq!(env.data().map(|d| d.token.clone()), Some(token.clone()));
    assert_eq!(api.store().get_auth_token(), Some(token));
    assert_eq!(api.store().get_user_profile(), Some(sample_user()));
}

#[test]
fn login_request_shape() {
    let api = api_with(MockTransport::new().respond(200, serde_json::json!({ "token": "t" })));
    let _ = block_on(api.login(&login_request()));

    let requests = api.transport().requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, Method::Post);
    assert_eq!(req.url, "https://api.example.com/users/login");
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert!(req.header("authorization").is_none());
    let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap_or_default()).expect("json body");
    assert_eq!(body, serde_json::json!({ "email": "riley@example.com", "password": "hunter22" }));
}

#[test]
fn login_failure_surfaces_backend_message_and_keeps_store_empty() {
    let api = api_with(MockTransport::new().respond(401, serde_json::json!({ "message": "Invalid email or password" })));

    let env = block_on(api.login(&login_request()));

    assert!(!env.is_success());
    assert_eq!(env.error(), Some("Invalid email or password"));
    assert!(env.data().is_none());
    assert!(api.store().get_auth_token().is_none());
}

#[test]
fn network_failure_becomes_error_envelope() {
    let api = api_with(MockTransport::new().fail(AuthError::Network("connection refused".to_owned())));
    let env = block_on(api.login(&login_request()));
    assert_eq!(env.error(), Some("Network error: connection refused"));
}

#[test]
fn malformed_json_becomes_error_envelope() {
    let api = api_with(MockTransport::new().respond_raw(200, "<html>oops</html>"));
    let env = block_on(api.login(&login_request()));
    assert!(!env.is_success());
    assert!(env.error().unwrap_or_default().starts_with("Invalid server response"));
}

#[test]
fn login_unwraps_data_envelope_from_backend() {
    let api = api_with(MockTransport::new().respond(
        200,
        serde_json::json!({ "success": true, "data": { "access_token": "wrapped", "user": sample_user_json() } }),
    ));
    let env = block_on(api.login(&login_request()));
    assert_eq!(env.data().map(|d| d.token.as_str()), Some("wrapped"));
    assert_eq!(api.store().get_auth_token().as_deref(), Some("wrapped"));
}

// =============================================================
// bearer header
// =============================================================

#[test]
fn bearer_header_added_when_token_present() {
    let api = api_with(MockTransport::new().respond(200, sample_user_json()));
    seed_session(&api, "abc.def.ghi");

    let _ = block_on(api.get_current_user());

    let req = &api.transport().requests()[0];
    assert_eq!(req.header("Authorization"), Some("Bearer abc.def.ghi"));
    assert!(req.header("content-type").is_none());
}

// =============================================================
// logout
// =============================================================

#[test]
fn logout_clears_store_even_when_server_fails() {
    let api = api_with(MockTransport::new().respond(500, serde_json::json!({ "message": "boom" })));
    seed_session(&api, &live_token());

    let env = block_on(api.logout());

    assert!(!env.is_success());
    assert!(api.store().get_auth_token().is_none());
    assert!(api.store().get_user_profile().is_none());
    assert_eq!(api.transport().calls_to(LOGOUT_PATH), 1);
}

#[test]
fn logout_clears_store_when_offline() {
    let api = api_with(MockTransport::new().fail(AuthError::Network("offline".to_owned())));
    seed_session(&api, &live_token());
    let _ = block_on(api.logout());
    assert!(api.store().get_auth_token().is_none());
}

#[test]
fn logout_sends_bearer_before_clearing() {
    let api = api_with(MockTransport::new().respond_raw(204, ""));
    seed_session(&api, "tok.en.x");

    let env = block_on(api.logout());

    assert!(env.is_success());
    assert_eq!(api.transport().requests()[0].header("authorization"), Some("Bearer tok.en.x"));
    assert!(api.store().get_auth_token().is_none());
}

// =============================================================
// profile
// =============================================================

#[test]
fn get_current_user_accepts_wrapped_user_and_caches_it() {
    let api = api_with(MockTransport::new().respond(200, serde_json::json!({ "user": sample_user_json() })));
    api.store()
        .save_auth_data(&AuthData { token: "tok".to_owned(), user: None })
        .expect("seed token");

    let env = block_on(api.get_current_user());

    assert_eq!(env.data(), Some(&sample_user()));
    assert_eq!(api.store().get_user_profile(), Some(sample_user()));
    assert_eq!(api.transport().calls_to(CURRENT_USER_PATH), 1);
}

#[test]
fn update_profile_refreshes_cache_and_keeps_token() {
    let mut updated = sample_user_json();
    updated["name"] = serde_json::json!("Riley Renamed");
    let api = api_with(MockTransport::new().respond(200, updated));
    seed_session(&api, "keep-me");

    let update = ProfileUpdate { name: Some("Riley Renamed".to_owned()), ..ProfileUpdate::default() };
    let env = block_on(api.update_profile(&update));

    assert!(env.is_success());
    assert_eq!(api.store().get_auth_token().as_deref(), Some("keep-me"));
    assert_eq!(api.store().get_user_profile().map(|u| u.name), Some("Riley Renamed".to_owned()));
    let req = &api.transport().requests()[0];
    assert_eq!(req.method, Method::Put);
    assert_eq!(req.body.as_deref(), Some(r#"{"name":"Riley Renamed"}"#));
}

// =============================================================
// passwords
// =============================================================

#[test]
fn change_password_accepts_empty_body() {
    let api = api_with(MockTransport::new().respond_raw(200, ""));
    seed_session(&api, "tok");
    let request = ChangePasswordRequest { current_password: "old".to_owned(), new_password: "new".to_owned() };

    let env = block_on(api.change_password(&request));

    assert!(env.is_success());
    assert!(api.transport().requests()[0].url.ends_with(CHANGE_PASSWORD_PATH));
}

#[test]
fn forgot_password_trims_email() {
    let api = api_with(MockTransport::new().respond(200, serde_json::json!({ "message": "sent" })));
    let env = block_on(api.forgot_password("  riley@example.com "));
    assert!(env.is_success());
    let req = &api.transport().requests()[0];
    assert!(req.url.ends_with(PASSWORD_RESET_REQUEST_PATH));
    assert_eq!(req.body.as_deref(), Some(r#"{"email":"riley@example.com"}"#));
}

#[test]
fn reset_password_reports_rejection() {
    let api = api_with(MockTransport::new().respond(400, serde_json::json!({ "error": "Reset link expired" })));
    let request = ResetPasswordRequest { token: "r".to_owned(), new_password: "n".to_owned() };
    let env = block_on(api.reset_password(&request));
    assert_eq!(env.error(), Some("Reset link expired"));
    assert!(api.transport().requests()[0].url.ends_with(PASSWORD_RESET_VERIFY_PATH));
}

// =============================================================
// validate_token
// =============================================================

#[test]
fn validate_token_rejection_clears_session() {
    let api = api_with(MockTransport::new().respond(401, serde_json::json!({ "message": "expired" })));
    seed_session(&api, "tok");

    let env = block_on(api.validate_token());

    assert_eq!(env.data(), Some(&false));
    assert!(api.store().get_auth_token().is_none());
}

#[test]
fn validate_token_ok_keeps_session() {
    let api = api_with(MockTransport::new().respond(200, serde_json::json!({ "valid": true })));
    seed_session(&api, "tok");
    let env = block_on(api.validate_token());
    assert_eq!(env.data(), Some(&true));
    assert!(api.store().get_auth_token().is_some());
}

#[test]
fn validate_token_network_error_keeps_session() {
    let api = api_with(MockTransport::new().fail(AuthError::Network("offline".to_owned())));
    seed_session(&api, "tok");
    let env = block_on(api.validate_token());
    assert!(!env.is_success());
    assert!(api.store().get_auth_token().is_some());
}

// =============================================================
// register + google
// =============================================================

#[test]
fn register_without_token_does_not_start_session() {
    let api = api_with(MockTransport::new().respond(201, sample_user_json()));
    let request = RegisterRequest {
        name: "Riley Promoter".to_owned(),
        email: "riley@example.com".to_owned(),
        password: "pw".to_owned(),
        phone_number: None,
    };

    let env = block_on(api.register(&request));

    assert_eq!(env.data(), Some(&Some(sample_user())));
    assert!(api.store().get_auth_token().is_none());
    assert!(api.transport().requests()[0].url.ends_with(REGISTER_PATH));
}

#[test]
fn register_with_token_starts_session() {
    let api = api_with(MockTransport::new().respond(201, serde_json::json!({ "token": "new", "user": sample_user_json() })));
    let request = RegisterRequest {
        name: "Riley Promoter".to_owned(),
        email: "riley@example.com".to_owned(),
        password: "pw".to_owned(),
        phone_number: Some("+1 555 0199".to_owned()),
    };
    let env = block_on(api.register(&request));
    assert!(env.is_success());
    assert_eq!(api.store().get_auth_token().as_deref(), Some("new"));
    assert_eq!(api.store().get_user_profile(), Some(sample_user()));
}

#[test]
fn register_with_bare_token_keeps_session_without_profile() {
    let api = api_with(MockTransport::new().respond(201, serde_json::json!({ "token": "bare" })));
    let request = RegisterRequest {
        name: "Riley Promoter".to_owned(),
        email: "riley@example.com".to_owned(),
        password: "pw".to_owned(),
        phone_number: None,
    };

    let env = block_on(api.register(&request));

    assert_eq!(env.data(), Some(&None));
    assert_eq!(api.store().get_auth_token().as_deref(), Some("bare"));
    assert!(api.store().get_user_profile().is_none());
    assert_eq!(api.transport().requests().len(), 1);
}

#[test]
fn exchange_google_code_persists_session() {
    let api = api_with(MockTransport::new().respond(200, serde_json::json!({ "token": "g-tok", "user": sample_user_json() })));

    let env = block_on(api.exchange_google_code("4/abc"));

    assert!(env.is_success());
    assert_eq!(api.store().get_auth_token().as_deref(), Some("g-tok"));
    let req = &api.transport().requests()[0];
    assert!(req.url.ends_with(GOOGLE_CALLBACK_PATH));
    assert_eq!(req.body.as_deref(), Some(r#"{"code":"4/abc"}"#));
}

#[test]
fn google_config_returns_raw_payload() {
    let api = api_with(MockTransport::new().respond(200, serde_json::json!({ "clientIdSet": true })));
    let env = block_on(api.google_config());
    assert_eq!(env.data(), Some(&serde_json::json!({ "clientIdSet": true })));
}

#[test]
fn google_auth_url_uses_base() {
    let api = api_with(MockTransport::new());
    assert_eq!(api.google_auth_url(), "https://api.example.com/auth/google");
    assert!(api.transport().requests().is_empty());
}
