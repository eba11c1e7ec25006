//! Request size limits.
//!
//! The body limit applies while the document is buffered, before any engine
//! call. Oversized bodies are answered with 413 Payload Too Large.

use axum::extract::DefaultBodyLimit;

use crate::config::LimitsConfig;

pub fn body_limit(config: &LimitsConfig) -> DefaultBodyLimit {
    DefaultBodyLimit::max(config.max_body_bytes)
}
