use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    response::Json as ResponseJson,
    routing::post,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use services::services::login::{LoginOutcome, RedirectTarget};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, extract::bearer_token};

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct LoginCallbackResponse {
    pub login_count: i64,
    pub last_login_at: Option<DateTime<Utc>>,
    pub quiz_completed: bool,
    pub onboarding_completed: bool,
    pub redirect_to: RedirectTarget,
}

impl From<LoginOutcome> for LoginCallbackResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            login_count: outcome.profile.login_count,
            last_login_at: outcome.profile.last_login_at,
            quiz_completed: outcome.profile.quiz_completed,
            onboarding_completed: outcome.profile.onboarding_completed,
            redirect_to: outcome.redirect,
        }
    }
}

/// POST /auth/login-callback
/// Sync the profile, provision the trial and tell the client where to go
pub async fn login_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ResponseJson<ApiResponse<LoginCallbackResponse>>, ApiError> {
    let token = bearer_token(&headers);
    let outcome = state.login().handle_login(token.as_deref(), Utc::now()).await?;

    Ok(ResponseJson(ApiResponse::success(outcome.into())))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().route("/auth/login-callback", post(login_callback))
}
