use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::Utc;
use db::models::activity::ActivityKind;
use serde::Deserialize;
use services::services::{activity::ActivityService, streak::StreakSummary};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{
    AppState,
    error::ApiError,
    extract::{AuthUser, JsonBody},
};

#[derive(Debug, Deserialize, TS)]
pub struct RecordActivityRequest {
    pub kind: ActivityKind,
}

/// POST /activity
/// Mark today's practice and return the refreshed streak
pub async fn record_activity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(payload): JsonBody<RecordActivityRequest>,
) -> Result<ResponseJson<ApiResponse<StreakSummary>>, ApiError> {
    let summary = ActivityService::record(
        &state.db().pool,
        state.calendar(),
        user.user_id,
        payload.kind,
        Utc::now(),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(summary)))
}

/// GET /streak
pub async fn get_streak(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<ResponseJson<ApiResponse<StreakSummary>>, ApiError> {
    let summary =
        ActivityService::summary(&state.db().pool, state.calendar(), user.user_id, Utc::now())
            .await?;

    Ok(ResponseJson(ApiResponse::success(summary)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/activity", post(record_activity))
        .route("/streak", get(get_streak))
}
