//! Per-request correlation ids.
//!
//! Every request gets a fresh id which is recorded on the request span,
//! echoed in the `x-correlation-id` response header and included in JSON
//! bodies so a user-reported failure can be matched to log lines.

use std::fmt;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use ts_rs::TS;
use uuid::Uuid;

pub const CORRELATION_ID_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

tokio::task_local! {
    static CURRENT: CorrelationId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Id of the request being served. Outside of a request a fresh id is
    /// returned.
    pub fn current() -> Self {
        CURRENT.try_with(|id| *id).unwrap_or_default()
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Middleware: assign an id, run the rest of the stack inside a span carrying
/// it, and stamp the response header.
pub async fn assign_correlation_id(request: Request, next: Next) -> Response {
    let id = CorrelationId::new();

    let span = tracing::info_span!(
        "request",
        correlation_id = %id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    let mut response = CURRENT.scope(id, next.run(request).instrument(span)).await;

    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}
