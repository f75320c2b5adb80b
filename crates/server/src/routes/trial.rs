use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use chrono::Utc;
use db::models::user_subscription::UserSubscription;
use serde::{Deserialize, Serialize};
use services::services::trial::{TrialOutcome, TrialService};
use tracing::info;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    extract::{JsonBody, ServiceRole},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitTrialRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, TS)]
pub struct InitTrialResponse {
    pub subscription: UserSubscription,
}

/// POST /init-trial
/// Backend-to-backend trial provisioning for a known user id
pub async fn init_trial(
    State(state): State<AppState>,
    _service: ServiceRole,
    JsonBody(payload): JsonBody<InitTrialRequest>,
) -> Result<ResponseJson<ApiResponse<InitTrialResponse>>, ApiError> {
    let raw = payload
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId is required".to_string()))?;
    let user_id = Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::BadRequest("userId must be a UUID".to_string()))?;

    let outcome = TrialService::ensure_trial(&state.db().pool, user_id, Utc::now()).await?;
    state.access().invalidate(user_id).await;

    let message = match &outcome {
        TrialOutcome::Created(_) => "Trial created",
        TrialOutcome::AlreadyExists(_) => "Subscription already exists",
    };
    info!(user_id = %user_id, created = outcome.was_created(), "init-trial handled");

    Ok(ResponseJson(ApiResponse::success_with_message(
        InitTrialResponse {
            subscription: outcome.into_subscription(),
        },
        message,
    )))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().route("/init-trial", post(init_trial))
}
