use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::Utc;
use services::services::access::AccessDecision;
use utils::response::ApiResponse;

use crate::{AppState, extract::AuthUser};

/// GET /subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ResponseJson<ApiResponse<AccessDecision>> {
    let decision = state.access().check(user.user_id, Utc::now()).await;
    ResponseJson(ApiResponse::success(decision))
}

/// POST /subscription/revalidate
/// Same as GET but skips the record cache
pub async fn revalidate_subscription(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ResponseJson<ApiResponse<AccessDecision>> {
    let decision = state.access().revalidate(user.user_id, Utc::now()).await;
    ResponseJson(ApiResponse::success(decision))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/subscription", get(get_subscription))
        .route("/subscription/revalidate", post(revalidate_subscription))
}
