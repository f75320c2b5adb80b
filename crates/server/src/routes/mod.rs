use axum::{Router, middleware};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utils::correlation::{CORRELATION_ID_HEADER, assign_correlation_id};

use crate::{AppState, error::ApiError};

pub mod activity;
pub mod auth;
pub mod health;
pub mod onboarding;
pub mod subscription;
pub mod trial;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([CORRELATION_ID_HEADER]);

    Router::new()
        .merge(auth::router(&state))
        .merge(trial::router(&state))
        .merge(subscription::router(&state))
        .merge(onboarding::router(&state))
        .merge(activity::router(&state))
        .merge(health::router(&state))
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(assign_correlation_id))
        .layer(cors)
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
