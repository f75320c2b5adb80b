use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use serde::Serialize;
use services::services::database_validator::{DatabaseValidator, ValidationResult};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize, TS)]
pub struct HealthReport {
    pub status: String,
    pub database: ValidationResult,
}

/// GET /health
/// 200 when the schema is complete, 503 otherwise
pub async fn health(
    State(state): State<AppState>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<HealthReport>>), ApiError> {
    let database = DatabaseValidator::new(state.db().pool.clone())
        .validate()
        .await?;

    let (code, status) = if database.is_ok() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    Ok((
        code,
        ResponseJson(ApiResponse::success(HealthReport {
            status: status.to_string(),
            database,
        })),
    ))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().route("/health", get(health))
}
