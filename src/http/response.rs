//! Public JSON response types.

use serde::{Deserialize, Serialize};

use crate::engine::{Metadata, OutputFormat};
use crate::health::HealthStatus;

/// `POST /parse` result.
///
/// `content` is present for `text` and `html`, `metadata` for `metadata`.
/// `content_length` counts characters of the extracted content (or of the
/// serialized metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResponse {
    pub success: bool,
    pub format: OutputFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    pub content_length: usize,
    pub mime_type: String,
    pub processing_time_ms: u64,
}

/// `POST /detect` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub mime_type: String,
}

/// `POST /language` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageResponse {
    pub language: String,
}

/// `GET /types` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypesResponse {
    pub count: usize,
    pub types: Vec<String>,
}

/// `GET /health` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub engine_ready: bool,
    pub uptime_secs: u64,
    /// Unix time of the response, in seconds.
    pub timestamp: u64,
}

/// `GET /version` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    /// The engine's version string, verbatim.
    pub version: String,
    pub service_version: String,
}

/// `GET /` overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub status: String,
    pub engine_ready: bool,
    pub version: String,
    pub usage: Usage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub endpoints: Vec<EndpointInfo>,
    pub auth: String,
    pub formats: Vec<OutputFormat>,
    pub content_types: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub method: String,
    pub path: String,
    pub auth: bool,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
