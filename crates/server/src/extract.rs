//! Request extractors shared by the route modules.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use secrecy::ExposeSecret;
use services::services::auth::{AuthError, AuthenticatedUser};
use subtle::ConstantTimeEq;

use crate::{AppState, error::ApiError};

/// Bearer token from the `Authorization` header. Malformed headers read as
/// absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().to_string())
}

/// A user whose bearer token the auth backend accepted.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let user = state.auth().verify(&token).await?;
        Ok(Self(user))
    }
}

/// Caller presented the service-role key. Only trusted backend callers hold
/// it.
#[derive(Debug, Clone, Copy)]
pub struct ServiceRole;

impl FromRequestParts<AppState> for ServiceRole {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(ApiError::ServiceUnauthorized)?;
        let expected = state.service_role_key().expose_secret().as_bytes();
        if bool::from(token.as_bytes().ct_eq(expected)) {
            Ok(Self)
        } else {
            Err(ApiError::ServiceUnauthorized)
        }
    }
}

/// `axum::Json` with rejections rendered in the API error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
