//! HTTP gateways to the task API.
//!
//! [`ApiClient`] holds the base URL and a pooled `reqwest` client. The
//! operations live in [`auth`], [`tasks`] and [`tags`] as inherent methods;
//! each one sends exactly one request (no retries, no backoff) and turns a
//! non-success status into [`ApiError`] carrying the server's `message`, or a
//! fixed per-operation fallback when the body has none.

pub mod auth;
pub mod tags;
pub mod tasks;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use taskdeck_proto::ValidationError;
use taskdeck_proto::response::ErrorBody;

use crate::session::AuthToken;

/// Errors surfaced by gateway calls and the view-models built on them.
///
/// `Display` is the user-facing message, so view-models record
/// `err.to_string()` as their error state.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was rejected locally and never sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Signin was rejected.
    #[error("{0}")]
    Authentication(String),

    /// Signup was rejected.
    #[error("{0}")]
    Registration(String),

    /// The API answered with a non-success status, an undecodable body, or
    /// could not be reached at all (`status` is `None`).
    #[error("{message}")]
    Remote {
        /// HTTP status code, if a response arrived.
        status: Option<u16>,
        /// Server-supplied message or the operation's fallback.
        message: String,
    },

    /// The operation needs a signed-in session.
    #[error("not signed in")]
    NotAuthenticated,

    /// The configured base URL cannot address the API.
    #[error("invalid API base URL {url}: {reason}")]
    InvalidBaseUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// HTTP status of a [`Remote`](Self::Remote) error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => *status,
            _ => None,
        }
    }

    fn remote(status: Option<u16>, message: &str) -> Self {
        Self::Remote {
            status,
            message: message.to_string(),
        }
    }
}

/// Client for the task API rooted at a base URL.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Creates a client for the API at `base_url`.
    ///
    /// A path prefix in `base_url` (e.g. `https://host/api`) is kept in
    /// front of every endpoint path.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if `base_url` does not parse or
    /// cannot carry a path, and [`ApiError::Client`] if the TLS backend fails
    /// to initialize.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "expected an http(s) URL".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("taskdeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    /// The base URL every endpoint is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves endpoint path segments against the base URL.
    ///
    /// Segments are percent-encoded, so ids cannot escape their position.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Starts a request, attaching the bearer header when a token is given.
    fn request(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&AuthToken>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        let builder = self.http.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        })
    }

    /// Sends a request and decodes a success body as `T`.
    ///
    /// Any failure becomes [`ApiError::Remote`]; `fallback` is used when
    /// the server gives no message of its own.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "request failed before a response arrived");
            ApiError::remote(None, fallback)
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string());
            tracing::debug!(status = status.as_u16(), %message, "api returned error status");
            return Err(ApiError::Remote {
                status: Some(status.as_u16()),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| {
            tracing::warn!(status = status.as_u16(), error = %e, "failed to decode api response");
            ApiError::remote(Some(status.as_u16()), fallback)
        })
    }
}
