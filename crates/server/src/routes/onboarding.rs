use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use services::services::onboarding::OnboardingService;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{
    AppState,
    error::ApiError,
    extract::{AuthUser, JsonBody},
};

#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
pub struct CompleteOnboardingRequest {
    pub quiz_completed: bool,
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    pub quiz_completed: bool,
    pub onboarding_completed: bool,
}

/// POST /onboarding/complete
pub async fn complete_onboarding(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(payload): JsonBody<CompleteOnboardingRequest>,
) -> Result<ResponseJson<ApiResponse<OnboardingStatus>>, ApiError> {
    let profile = OnboardingService::complete(
        &state.db().pool,
        user.user_id,
        payload.quiz_completed,
        Utc::now(),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(OnboardingStatus {
        quiz_completed: profile.quiz_completed,
        onboarding_completed: profile.onboarding_completed,
    })))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().route("/onboarding/complete", post(complete_onboarding))
}
