//! Bearer-token verification against the hosted auth backend.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("auth backend rejected our api key: {0}")]
    Misconfigured(String),
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("rate limited")]
    RateLimited,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("json error: {0}")]
    Serde(String),
}

impl AuthError {
    /// Returns true if the error is transient and should be retried.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout | Self::RateLimited => true,
            Self::Http { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }

    /// The caller's credential is the problem, not the backend.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::MissingToken | Self::InvalidToken)
    }
}

/// Identity resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// Resolves bearer credentials to users. Implementations do not create or
/// modify any application state.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn verify(&self, bearer_token: &str) -> Result<AuthenticatedUser, AuthError>;
}

#[derive(Debug, Deserialize)]
struct AuthUserResponse {
    id: Uuid,
    email: Option<String>,
}

/// Client for the hosted backend's `GET /auth/v1/user` endpoint.
#[derive(Debug, Clone)]
pub struct SupabaseAuthClient {
    http: Client,
    user_endpoint: Url,
    anon_key: String,
}

impl SupabaseAuthClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: &Url, anon_key: &SecretString) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("devotional-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        let user_endpoint = base_url
            .join("auth/v1/user")
            .map_err(|e| AuthError::Misconfigured(e.to_string()))?;

        Ok(Self {
            http,
            user_endpoint,
            anon_key: anon_key.expose_secret().to_string(),
        })
    }

    async fn fetch_user(&self, bearer_token: &str) -> Result<AuthenticatedUser, AuthError> {
        let res = self
            .http
            .get(self.user_endpoint.clone())
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = res.status();
        if status.is_success() {
            let user = res
                .json::<AuthUserResponse>()
                .await
                .map_err(|e| AuthError::Serde(e.to_string()))?;
            return Ok(AuthenticatedUser {
                user_id: user.id,
                email: user.email,
            });
        }

        let body = res.text().await.unwrap_or_default();
        Err(classify_failure(status, body))
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthClient {
    async fn verify(&self, bearer_token: &str) -> Result<AuthenticatedUser, AuthError> {
        let bearer_token = bearer_token.trim();
        if bearer_token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        (|| async { self.fetch_user(bearer_token).await })
            .retry(
                &ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(200))
                    .with_max_delay(Duration::from_secs(2))
                    .with_max_times(2)
                    .with_jitter(),
            )
            .when(|e: &AuthError| e.should_retry())
            .notify(|e, dur| {
                warn!(
                    "Token verification failed, retrying after {:.2}s: {}",
                    dur.as_secs_f64(),
                    e
                )
            })
            .await
    }
}

/// The backend answers 401 both for a bad user token and for a bad project
/// api key; only the latter is our misconfiguration.
fn classify_failure(status: StatusCode, body: String) -> AuthError {
    let lowered = body.to_ascii_lowercase();
    match status {
        StatusCode::UNAUTHORIZED if lowered.contains("api key") => AuthError::Misconfigured(body),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AuthError::InvalidToken,
        StatusCode::TOO_MANY_REQUESTS => AuthError::RateLimited,
        s => AuthError::Http {
            status: s.as_u16(),
            body,
        },
    }
}

fn map_reqwest_error(e: reqwest::Error) -> AuthError {
    if e.is_timeout() {
        AuthError::Timeout
    } else {
        AuthError::Transport(e.to_string())
    }
}
