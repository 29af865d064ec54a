//! Wire DTOs for the REST auth API and the uniform result envelope.
//!
//! DESIGN
//! ======
//! Backend payloads are not perfectly consistent (ids arrive as numbers or
//! strings, role fields vary by endpoint). `UserProfile` keeps every field it
//! does not name in `extra`, so caching and re-reading a profile is lossless.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AuthError;

/// Cached profile of the signed-in account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend identifier, normalized to a string. Empty when the payload
    /// (typically an inline redirect `user`) did not carry one.
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    /// Everything else the backend sent, including `role` and its variants.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    /// The plain `role` field, when the backend sent one as a string.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.extra.get("role").and_then(serde_json::Value::as_str)
    }
}

/// Token plus (optionally) the profile it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthData {
    #[serde(alias = "access_token", alias = "jwt")]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

/// Profile payloads arrive either bare or wrapped in `{ "user": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum UserPayload {
    Wrapped { user: UserProfile },
    Bare(UserProfile),
}

impl UserPayload {
    pub(crate) fn into_profile(self) -> UserProfile {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Partial profile update; absent fields are left untouched server-side.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Uniform `{success, data?, error?}` result of every auth API call.
///
/// Fields are private: `data` is present iff `success`, `error` iff not.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthEnvelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> AuthEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Convert back into a `Result`, with the error text as the `Err` value.
    ///
    /// # Errors
    ///
    /// Returns the envelope's error message when `success` is false.
    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (Some(data), None) => Ok(data),
            (_, error) => Err(error.unwrap_or_default()),
        }
    }
}

impl<T> From<Result<T, AuthError>> for AuthEnvelope<T> {
    fn from(result: Result<T, AuthError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        _ => Err(D::Error::custom("expected string or number id")),
    }
}
