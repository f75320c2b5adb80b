use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use services::services::{
    activity::ActivityError, auth::AuthError, database_validator::DatabaseValidationError,
    login::LoginError, onboarding::OnboardingError, trial::TrialError,
};
use thiserror::Error;
use tracing::{debug, error};
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Trial(#[from] TrialError),
    #[error(transparent)]
    Onboarding(#[from] OnboardingError),
    #[error(transparent)]
    Activity(#[from] ActivityError),
    #[error(transparent)]
    DatabaseValidation(#[from] DatabaseValidationError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("missing or invalid service credential")]
    ServiceUnauthorized,
    #[error("no route matches the request path")]
    RouteNotFound,
    #[error("method not allowed for this route")]
    MethodNotAllowed,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Login(LoginError::Unauthenticated(_)) | Self::ServiceUnauthorized => {
                StatusCode::UNAUTHORIZED
            }
            Self::Login(LoginError::AuthMisconfigured(_) | LoginError::AuthUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Login(LoginError::ProfileSync { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(e) if e.is_unauthenticated() => StatusCode::UNAUTHORIZED,
            Self::Auth(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Onboarding(OnboardingError::ProfileNotFound(_)) | Self::RouteNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::DatabaseValidation(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Trial(_) | Self::Onboarding(_) | Self::Activity(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show a client. Backend error text stays in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Onboarding(OnboardingError::ProfileNotFound(_)) => {
                "Profile not found".to_string()
            }
            Self::RouteNotFound => "Not found".to_string(),
            Self::MethodNotAllowed => "Method not allowed".to_string(),
            _ => match self.status_code() {
                StatusCode::UNAUTHORIZED => "Unauthorized".to_string(),
                StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable".to_string(),
                _ => "Internal server error".to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = ApiResponse::<()>::error(self.public_message());
        (status, ResponseJson(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_map_to_401_and_503() {
        let err = ApiError::from(LoginError::from(AuthError::InvalidToken));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.public_message(), "Unauthorized");

        let err = ApiError::from(LoginError::from(AuthError::Misconfigured(
            "Invalid API key".into(),
        )));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.public_message().contains("API key"));

        let err = ApiError::from(AuthError::Timeout);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_storage_errors_are_generic() {
        let err = ApiError::from(ActivityError::Database(sqlx::Error::RowNotFound));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_routing_failures_keep_their_status() {
        assert_eq!(ApiError::RouteNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::RouteNotFound.public_message(), "Not found");
        assert_eq!(
            ApiError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
