// HTTP-level tests driving the full router with tower::ServiceExt::oneshot,
// backed by an in-memory database and a stub auth provider.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use db::DBService;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use server::{AppState, routes};
use services::services::{
    auth::{AuthError, AuthProvider, AuthenticatedUser},
    config::Config,
};
use tower::ServiceExt;
use uuid::Uuid;

const SERVICE_KEY: &str = "service-role-secret";

struct StubAuth {
    users: HashMap<String, Uuid>,
}

#[async_trait]
impl AuthProvider for StubAuth {
    async fn verify(&self, bearer_token: &str) -> Result<AuthenticatedUser, AuthError> {
        if bearer_token == "backend-down" {
            return Err(AuthError::Http {
                status: 502,
                body: "upstream exploded".to_string(),
            });
        }
        self.users
            .get(bearer_token)
            .map(|user_id| AuthenticatedUser {
                user_id: *user_id,
                email: None,
            })
            .ok_or(AuthError::InvalidToken)
    }
}

struct TestApp {
    router: Router,
    db: DBService,
    user_id: Uuid,
}

async fn app() -> TestApp {
    let db = DBService::new_in_memory().await.unwrap();
    let user_id = Uuid::new_v4();
    let auth = StubAuth {
        users: HashMap::from([("user-token".to_string(), user_id)]),
    };
    let config = Config::from_lookup(|key| match key {
        "SUPABASE_URL" => Some("https://project.supabase.co".to_string()),
        "SUPABASE_ANON_KEY" => Some("anon".to_string()),
        "SUPABASE_SERVICE_ROLE_KEY" => Some(SERVICE_KEY.to_string()),
        _ => None,
    })
    .unwrap();

    let state = AppState::new(db.clone(), Arc::new(auth), &config);
    TestApp {
        router: routes::router(state),
        db,
        user_id,
    }
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let header_id = response
        .headers()
        .get("x-correlation-id")
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json, header_id)
}

#[tokio::test]
async fn login_callback_provisions_trial_and_grants_access() {
    let app = app().await;

    let (status, body, header_id) = send(
        &app.router,
        Method::POST,
        "/auth/login-callback",
        Some("user-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["loginCount"], json!(1));
    assert_eq!(body["redirectTo"], json!("/onboarding"));
    assert_eq!(body["correlationId"].as_str(), header_id.as_deref());

    let (status, body, _) = send(
        &app.router,
        Method::GET,
        "/subscription",
        Some("user-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isActive"], json!(true));
    assert_eq!(body["isInTrial"], json!(true));
    assert_eq!(body["daysRemaining"], json!(3));
    assert_eq!(body["planName"], json!("Trial Gratuito"));
}

#[tokio::test]
async fn login_callback_without_credentials_is_401_without_side_effects() {
    let app = app().await;

    for token in [None, Some("someone-else")] {
        let (status, body, header_id) =
            send(&app.router, Method::POST, "/auth/login-callback", token, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("Unauthorized"));
        assert_eq!(body["correlationId"].as_str(), header_id.as_deref());
    }

    let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
        .fetch_one(&app.db.pool)
        .await
        .unwrap();
    assert_eq!(profiles, 0);
}

#[tokio::test]
async fn auth_backend_failure_is_503_with_generic_message() {
    let app = app().await;
    let (status, body, _) = send(
        &app.router,
        Method::POST,
        "/auth/login-callback",
        Some("backend-down"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!body["error"].as_str().unwrap().contains("exploded"));
}

#[tokio::test]
async fn subscription_without_record_is_inactive() {
    let app = app().await;
    let (status, body, _) = send(
        &app.router,
        Method::POST,
        "/subscription/revalidate",
        Some("user-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isActive"], json!(false));
    assert_eq!(body["planName"], Value::Null);
}

#[tokio::test]
async fn init_trial_requires_service_role_key() {
    let app = app().await;
    let body = json!({ "userId": app.user_id });

    let (status, _, _) = send(
        &app.router,
        Method::POST,
        "/init-trial",
        None,
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(
        &app.router,
        Method::POST,
        "/init-trial",
        Some("user-token"),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn init_trial_validates_user_id() {
    let app = app().await;

    for payload in [json!({}), json!({ "userId": "" }), json!({ "userId": "not-a-uuid" })] {
        let (status, body, _) = send(
            &app.router,
            Method::POST,
            "/init-trial",
            Some(SERVICE_KEY),
            Some(payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
    }
}

#[tokio::test]
async fn init_trial_is_idempotent() {
    let app = app().await;
    let payload = json!({ "userId": app.user_id });

    let (status, first, _) = send(
        &app.router,
        Method::POST,
        "/init-trial",
        Some(SERVICE_KEY),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], json!("Trial created"));
    assert_eq!(first["subscription"]["status"], json!("trialing"));

    let (status, second, _) = send(
        &app.router,
        Method::POST,
        "/init-trial",
        Some(SERVICE_KEY),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["message"], json!("Subscription already exists"));
    assert_eq!(second["subscription"]["id"], first["subscription"]["id"]);
}

#[tokio::test]
async fn onboarding_completion_changes_redirect() {
    let app = app().await;

    let (status, _, _) = send(
        &app.router,
        Method::POST,
        "/onboarding/complete",
        Some("user-token"),
        Some(json!({ "quizCompleted": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&app.router, Method::POST, "/auth/login-callback", Some("user-token"), None).await;
    let (status, body, _) = send(
        &app.router,
        Method::POST,
        "/onboarding/complete",
        Some("user-token"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["onboardingCompleted"], json!(true));
    assert_eq!(body["quizCompleted"], json!(false));

    let (_, body, _) = send(
        &app.router,
        Method::POST,
        "/auth/login-callback",
        Some("user-token"),
        None,
    )
    .await;
    assert_eq!(body["redirectTo"], json!("/home"));
    assert_eq!(body["loginCount"], json!(2));
}

#[tokio::test]
async fn activity_updates_streak() {
    let app = app().await;

    let (status, body, _) = send(
        &app.router,
        Method::POST,
        "/activity",
        Some("user-token"),
        Some(json!({ "kind": "reading" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentStreak"], json!(1));
    assert_eq!(body["activeDaysLast30"], json!(1));

    let (status, body, _) = send(&app.router, Method::GET, "/streak", Some("user-token"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentStreak"], json!(1));
    let week = body["week"].as_array().unwrap();
    assert_eq!(week.len(), 7);
    assert_eq!(week[6]["active"], json!(true));
    assert_eq!(week[6]["date"], body["today"]);
}

#[tokio::test]
async fn activity_rejects_unknown_kind() {
    let app = app().await;
    let (status, body, _) = send(
        &app.router,
        Method::POST,
        "/activity",
        Some("user-token"),
        Some(json!({ "kind": "fasting" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn health_reports_schema() {
    let app = app().await;
    let (status, body, _) = send(&app.router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["database"]["missingTables"], json!([]));

    sqlx::query("DROP TABLE activity_log")
        .execute(&app.db.pool)
        .await
        .unwrap();
    let (status, body, _) = send(&app.router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], json!("degraded"));
}

#[tokio::test]
async fn unknown_route_is_404_envelope() {
    let app = app().await;
    let (status, body, header_id) =
        send(&app.router, Method::GET, "/no-such-route", Some("user-token"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Not found"));
    assert!(header_id.is_some());
    assert_eq!(body["correlationId"].as_str(), header_id.as_deref());
}

#[tokio::test]
async fn wrong_method_is_405_envelope() {
    let app = app().await;
    let (status, body, header_id) =
        send(&app.router, Method::GET, "/init-trial", Some(SERVICE_KEY), None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Method not allowed"));
    assert_eq!(body["correlationId"].as_str(), header_id.as_deref());
}
