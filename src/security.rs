use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::model::ErrorResponse;
use crate::AppState;

/// Header carrying the write key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Constant-time string comparison to prevent timing attacks
/// Use this for comparing API keys and other sensitive values
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Reads pass through. Writes need a matching `x-api-key` when a key is
/// configured.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    if is_read_only(request.method()) {
        return next.run(request).await;
    }

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if constant_time_compare(provided, expected) {
        return next.run(request).await;
    }

    warn!(
        "Rejected {} {}: missing or invalid API key",
        request.method(),
        request.uri().path()
    );
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            message: "Unauthorized".to_string(),
            translations: None,
        }),
    )
        .into_response()
}

fn is_read_only(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}
