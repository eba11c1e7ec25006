//! Route handlers.
//!
//! Protected handlers run behind the API key gate and refuse work with 503
//! until the engine is ready. None of them keep the document past the
//! response.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode, Uri},
    Json,
};
use serde::Deserialize;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::engine::{Document, EngineError, Markup, Metadata, OutputFormat};
use crate::health::HealthStatus;
use crate::http::error::ApiError;
use crate::http::response::{
    DetectResponse, EndpointInfo, HealthResponse, LanguageResponse, ParseResponse, ServiceInfo,
    TypesResponse, Usage, VersionResponse,
};
use crate::http::server::AppState;
use crate::resilience::with_deadline;

pub const SERVICE_NAME: &str = "Secure Tika Gateway";

#[derive(Debug, Deserialize)]
pub struct ParseParams {
    pub format: Option<String>,
}

fn ensure_ready(state: &AppState) -> Result<(), ApiError> {
    if state.health.is_ready() {
        Ok(())
    } else {
        Err(ApiError::UpstreamUnavailable(
            "Parsing engine is still starting. Please wait and try again.".to_string(),
        ))
    }
}

fn document(headers: &HeaderMap, body: Result<Bytes, BytesRejection>) -> Result<Document, ApiError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let doc = Document::new(body?, content_type);
    if doc.is_empty() {
        return Err(ApiError::BadRequest(
            "No file data provided. Send file as request body.".to_string(),
        ));
    }
    Ok(doc)
}

/// The bare MIME type recorded by the engine in the metadata, if any.
fn metadata_mime_type(metadata: &Metadata) -> Option<String> {
    let value = metadata.get("Content-Type")?;
    let raw = match value {
        serde_json::Value::String(s) => s.as_str(),
        serde_json::Value::Array(items) => items.first()?.as_str()?,
        _ => return None,
    };
    let bare = raw.split(';').next().unwrap_or(raw).trim();
    (!bare.is_empty()).then(|| bare.to_string())
}

/// POST /parse?format={text,html,metadata}
pub async fn parse(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ParseParams>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ParseResponse>, ApiError> {
    ensure_ready(&state)?;
    let doc = document(&headers, body)?;

    let Query(params) = query?;
    let format = match params.format.as_deref() {
        Some(raw) => raw.parse::<OutputFormat>().map_err(ApiError::BadRequest)?,
        None => OutputFormat::default(),
    };

    tracing::info!(format = format.as_str(), bytes = doc.bytes.len(), "Processing document");
    let start = Instant::now();
    let deadline = state.request_timeout;
    let engine = state.engine.as_ref();

    // One deadline covers every engine call made for this request.
    let response = with_deadline(deadline, async {
        let response = match format {
            OutputFormat::Text | OutputFormat::Html => {
                let markup = if format == OutputFormat::Html {
                    Markup::Html
                } else {
                    Markup::Plain
                };
                let (content, mime_type) =
                    tokio::try_join!(engine.extract(&doc, markup), engine.detect(&doc))?;

                ParseResponse {
                    success: true,
                    format,
                    content_length: content.chars().count(),
                    content: Some(content),
                    metadata: None,
                    mime_type,
                    processing_time_ms: start.elapsed().as_millis() as u64,
                }
            }
            OutputFormat::Metadata => {
                let metadata = engine.metadata(&doc).await?;
                let mime_type = match metadata_mime_type(&metadata) {
                    Some(mime) => mime,
                    None => engine.detect(&doc).await?,
                };
                let serialized = serde_json::Value::Object(metadata.clone()).to_string();

                ParseResponse {
                    success: true,
                    format,
                    content: None,
                    content_length: serialized.chars().count(),
                    metadata: Some(metadata),
                    mime_type,
                    processing_time_ms: start.elapsed().as_millis() as u64,
                }
            }
        };
        Ok::<_, EngineError>(response)
    })
    .await?;

    tracing::info!(
        format = format.as_str(),
        mime_type = %response.mime_type,
        content_length = response.content_length,
        elapsed_ms = response.processing_time_ms,
        "Document processed"
    );
    Ok(Json(response))
}

/// POST /detect
pub async fn detect(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    ensure_ready(&state)?;
    let doc = document(&headers, body)?;

    let mime_type = with_deadline(state.request_timeout, state.engine.detect(&doc)).await?;
    tracing::debug!(mime_type = %mime_type, "Detected type");
    Ok(Json(DetectResponse { mime_type }))
}

/// POST /language
pub async fn language(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<LanguageResponse>, ApiError> {
    ensure_ready(&state)?;
    let doc = document(&headers, body)?;

    let language = with_deadline(state.request_timeout, state.engine.language(&doc)).await?;
    Ok(Json(LanguageResponse { language }))
}

/// GET /types
pub async fn types(State(state): State<AppState>) -> Result<Json<TypesResponse>, ApiError> {
    ensure_ready(&state)?;

    let types = with_deadline(state.request_timeout, state.engine.supported_types()).await?;
    Ok(Json(TypesResponse {
        count: types.len(),
        types,
    }))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let status = state.health.status();
    let ready = status == HealthStatus::Ready;
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(HealthResponse {
            status,
            engine_ready: ready,
            uptime_secs: state.health.uptime().as_secs(),
            timestamp,
        }),
    )
}

/// GET /version
pub async fn version(State(state): State<AppState>) -> Result<Json<VersionResponse>, ApiError> {
    let deadline = state.request_timeout;
    let engine = state.engine.as_ref();
    let version = state
        .health
        .engine_version_or_init(|| with_deadline(deadline, engine.version()))
        .await?;

    Ok(Json(VersionResponse {
        version: version.to_string(),
        service_version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// GET /
pub async fn index(State(state): State<AppState>) -> Json<ServiceInfo> {
    let endpoint = |method: &str, path: &str, auth: bool| EndpointInfo {
        method: method.to_string(),
        path: path.to_string(),
        auth,
    };

    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        status: "running".to_string(),
        engine_ready: state.health.is_ready(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        usage: Usage {
            endpoints: vec![
                endpoint("POST", "/parse?format={text,html,metadata}", true),
                endpoint("POST", "/detect", true),
                endpoint("POST", "/language", true),
                endpoint("GET", "/types", true),
                endpoint("GET", "/health", false),
                endpoint("GET", "/version", false),
            ],
            auth: "X-API-Key header required on protected endpoints".to_string(),
            formats: vec![OutputFormat::Text, OutputFormat::Html, OutputFormat::Metadata],
            content_types: "PDF, Word, Excel, PowerPoint, HTML, images and 1000+ other formats"
                .to_string(),
        },
    })
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
