//! Authentication state and its lifecycle.
//!
//! A [`Session`] is a plain value: either anonymous or carrying both a
//! token and a user identity, never one without the other. The
//! [`SessionStore`] is its single owner. It hydrates the session from
//! durable storage at startup, replaces it on signin, and clears it on
//! signout. View-models receive a clone of the current session when they
//! are constructed.

pub mod storage;

use std::fmt;

use taskdeck_proto::{SignInRequest, SignUpRequest, UserIdentity};

use crate::api::auth::LOGIN_FAILED;
use crate::api::{ApiClient, ApiError};

pub use storage::{
    FileStorage, MemoryStorage, SessionStorage, StorageError, TOKEN_KEY, USER_KEY,
};

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The API rejected or failed the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Opaque bearer credential. Never empty; `Debug` does not reveal it.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a raw token, rejecting an empty or whitespace-only string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Who is signed in, if anyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    /// Nobody is signed in.
    #[default]
    Anonymous,
    /// Token and identity obtained together from a signin.
    Authenticated {
        /// The signed-in user.
        user: UserIdentity,
        /// Bearer token for authenticated requests.
        token: AuthToken,
    },
}

impl Session {
    /// Returns `true` if both token and identity are present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// The signed-in user.
    #[must_use]
    pub const fn user(&self) -> Option<&UserIdentity> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            Self::Anonymous => None,
        }
    }

    /// The bearer token.
    #[must_use]
    pub const fn token(&self) -> Option<&AuthToken> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            Self::Anonymous => None,
        }
    }
}

/// Owns the [`Session`] and keeps durable storage in step with it.
pub struct SessionStore<S: SessionStorage> {
    api: ApiClient,
    storage: S,
    session: Session,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Creates the store, restoring a previous session from `storage`.
    ///
    /// The session is authenticated only if both entries are present, the
    /// token is non-empty and the identity record parses. Anything else is
    /// logged and yields an anonymous session; startup never fails here.
    pub fn hydrate(api: ApiClient, storage: S) -> Self {
        let session = restore(&storage);
        tracing::debug!(
            authenticated = session.is_authenticated(),
            "session hydrated"
        );
        Self {
            api,
            storage,
            session,
        }
    }

    /// The current session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// The API client the store signs in through.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Registers an account. Never changes the session: signup does not
    /// sign the user in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for empty fields and
    /// [`ApiError::Registration`] when the server rejects the signup.
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let body = SignUpRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.api.sign_up(&body).await?;
        tracing::info!(
            username,
            message = response.message.as_deref().unwrap_or_default(),
            "signed up"
        );
        Ok(())
    }

    /// Exchanges credentials for a token and replaces the session.
    ///
    /// The identity is the profile echoed by the server if any, otherwise a
    /// username-only record. Both entries are persisted before the
    /// in-memory session changes; on any error the session is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Authentication`] when the server rejects the
    /// credentials or answers without a token, and
    /// [`SessionError::Storage`] when persisting fails.
    pub async fn sign_in(&mut self, username: &str, password: &str) -> Result<&Session, SessionError> {
        let body = SignInRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.api.sign_in(&body).await?;

        let Some(token) = response.token.and_then(AuthToken::new) else {
            let message = response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| LOGIN_FAILED.to_string());
            tracing::info!(username, %message, "signin returned no token");
            return Err(ApiError::Authentication(message).into());
        };
        let user = response
            .user
            .filter(|u| !u.username.is_empty())
            .unwrap_or_else(|| UserIdentity::from_username(username));

        self.persist(&user, &token)?;
        tracing::info!(username = %user.username, "signed in");
        self.session = Session::Authenticated { user, token };
        Ok(&self.session)
    }

    /// Clears the session and its durable entries. Always succeeds;
    /// storage failures are logged.
    pub fn sign_out(&mut self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "failed to clear stored session entry");
            }
        }
        if self.session.is_authenticated() {
            tracing::info!("signed out");
        }
        self.session = Session::Anonymous;
    }

    fn persist(&self, user: &UserIdentity, token: &AuthToken) -> Result<(), SessionError> {
        let user_json = serde_json::to_string(user).map_err(|e| {
            StorageError::Write {
                path: USER_KEY.into(),
                source: std::io::Error::other(e),
            }
        })?;
        self.storage.set(TOKEN_KEY, token.as_str())?;
        if let Err(e) = self.storage.set(USER_KEY, &user_json) {
            // Keep the both-or-neither rule for the next hydration.
            if let Err(cleanup) = self.storage.remove(TOKEN_KEY) {
                tracing::warn!(error = %cleanup, "failed to roll back stored token");
            }
            return Err(e.into());
        }
        Ok(())
    }
}

/// Rebuilds a session from storage, falling back to anonymous.
fn restore<S: SessionStorage>(storage: &S) -> Session {
    let read = |key: &str| match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read stored session entry");
            None
        }
    };

    match (read(TOKEN_KEY), read(USER_KEY)) {
        (Some(raw_token), Some(raw_user)) => {
            let Some(token) = AuthToken::new(raw_token) else {
                tracing::warn!("stored token is empty, starting anonymous");
                return Session::Anonymous;
            };
            match serde_json::from_str::<UserIdentity>(&raw_user) {
                Ok(user) => Session::Authenticated { user, token },
                Err(e) => {
                    tracing::warn!(error = %e, "stored user record is corrupt, starting anonymous");
                    Session::Anonymous
                }
            }
        }
        (None, None) => Session::Anonymous,
        (token, _) => {
            tracing::warn!(
                has_token = token.is_some(),
                "stored session is incomplete, starting anonymous"
            );
            Session::Anonymous
        }
    }
}
