//! Signup and signin endpoints. Neither sends a bearer token.

use reqwest::Method;

use taskdeck_proto::{AuthResponse, SignInRequest, SignUpRequest};

use super::{ApiClient, ApiError};

/// Fallback message for a rejected signup.
pub const REGISTRATION_FAILED: &str = "Registration failed";
/// Fallback message for a rejected signin.
pub const LOGIN_FAILED: &str = "Login failed";
/// Message the server attaches to a successful signup.
pub const SIGNUP_SUCCEEDED: &str = "You are signed up !";

impl ApiClient {
    /// `POST /user/signup`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty field (nothing is sent)
    /// and [`ApiError::Registration`] for any rejection by the server,
    /// including a success status whose message is not [`SIGNUP_SUCCEEDED`].
    pub async fn sign_up(&self, body: &SignUpRequest) -> Result<AuthResponse, ApiError> {
        body.validate()?;
        let request = self
            .request(Method::POST, &["user", "signup"], None)?
            .json(body);
        let response: AuthResponse = self
            .send(request, REGISTRATION_FAILED)
            .await
            .map_err(|e| match e {
                ApiError::Remote { message, .. } => ApiError::Registration(message),
                other => other,
            })?;
        match response.message.as_deref().map(str::trim) {
            Some(message) if !message.is_empty() && message != SIGNUP_SUCCEEDED => {
                Err(ApiError::Registration(message.to_string()))
            }
            _ => Ok(response),
        }
    }

    /// `POST /user/signin`.
    ///
    /// A success status without a token is still a response; the caller
    /// decides that it is a failed signin.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty field (nothing is sent)
    /// and [`ApiError::Authentication`] for any rejection by the server.
    pub async fn sign_in(&self, body: &SignInRequest) -> Result<AuthResponse, ApiError> {
        body.validate()?;
        let request = self
            .request(Method::POST, &["user", "signin"], None)?
            .json(body);
        self.send(request, LOGIN_FAILED).await.map_err(|e| match e {
            ApiError::Remote { message, .. } => ApiError::Authentication(message),
            other => other,
        })
    }
}
