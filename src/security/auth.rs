//! API key gate for protected routes.
//!
//! The `X-API-Key` header must equal the configured secret. The comparison
//! does not short-circuit on the first differing byte. Rejected requests never
//! reach a handler, so the engine is not called.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::http::error::ApiError;
use crate::http::request::request_id;
use crate::observability::metrics;

pub const API_KEY_HEADER: &str = "x-api-key";

/// The configured shared secret.
#[derive(Clone)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    pub fn new(secret: &str) -> Self {
        Self(Arc::from(secret))
    }

    pub fn matches(&self, candidate: &[u8]) -> bool {
        constant_time_eq(self.0.as_bytes(), candidate)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Byte equality whose running time depends only on the lengths.
fn constant_time_eq(expected: &[u8], candidate: &[u8]) -> bool {
    if expected.len() != candidate.len() {
        return false;
    }
    expected
        .iter()
        .zip(candidate)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

pub async fn require_api_key(
    State(key): State<ApiKey>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();

    match request.headers().get(API_KEY_HEADER) {
        Some(value) if key.matches(value.as_bytes()) => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!(request_id = %request_id(request.headers()), path = %path, "Invalid API key");
            metrics::record_auth_rejection("invalid");
            Err(ApiError::Unauthorized("Invalid API key"))
        }
        None => {
            tracing::warn!(request_id = %request_id(request.headers()), path = %path, "Missing API key");
            metrics::record_auth_rejection("missing");
            Err(ApiError::Unauthorized("Missing X-API-Key header"))
        }
    }
}
