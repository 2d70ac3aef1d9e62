//! Signup/signin payloads and the signed-in user's identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::{self, ValidationError};

/// The identity record kept next to the bearer token.
///
/// Only `username` is guaranteed: the signin response need not echo the
/// full profile, in which case the other fields stay empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Server-assigned identifier, if known.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Login name.
    pub username: String,
    /// Email address, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Account creation time, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserIdentity {
    /// An identity that knows nothing but the username.
    #[must_use]
    pub fn from_username(username: &str) -> Self {
        Self {
            id: None,
            username: username.to_string(),
            email: None,
            created_at: None,
        }
    }
}

/// Body of `POST /user/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUpRequest {
    /// Desired login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Plain-text password (TLS protects it in transit).
    pub password: String,
}

impl SignUpRequest {
    /// Rejects empty fields before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for the first empty field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::require("username", &self.username)?;
        validate::require("email", &self.email)?;
        validate::require("password", &self.password)
    }
}

/// Body of `POST /user/signin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignInRequest {
    /// Login name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

impl SignInRequest {
    /// Rejects empty fields before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for the first empty field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::require("username", &self.username)?;
        validate::require("password", &self.password)
    }
}

/// Response of both auth endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    /// Human-readable outcome.
    #[serde(default)]
    pub message: Option<String>,
    /// Bearer token; present only on a successful signin.
    #[serde(default)]
    pub token: Option<String>,
    /// Full profile, when the server chooses to echo it.
    #[serde(default)]
    pub user: Option<UserIdentity>,
}
