//! Apache Tika server client.
//!
//! # Endpoints used
//! - `PUT /tika`             text or HTML extraction (by `Accept`)
//! - `PUT /meta`             metadata as JSON
//! - `PUT /detect/stream`    MIME type detection
//! - `PUT /language/stream`  language identification
//! - `GET /mime-types`       supported types
//! - `GET /version`          engine version, also the readiness probe

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::future::Future;
use std::time::{Duration, Instant};

use crate::config::{EngineConfig, TimeoutConfig};
use crate::engine::types::{Document, EngineError, EngineResult, Markup, Metadata};
use crate::engine::Engine;
use crate::observability::metrics;

/// Longest slice of an engine error body carried into our own error messages.
const MAX_ERROR_BODY: usize = 512;

/// Engine implementation backed by a Tika server's HTTP interface.
#[derive(Clone)]
pub struct TikaEngine {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl TikaEngine {
    /// Create a client for the engine at `config.base_url`.
    pub fn new(config: &EngineConfig, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let request_timeout = Duration::from_secs(timeouts.request_secs);
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(request_timeout)
            .user_agent(concat!("tika-gateway/", env!("CARGO_PKG_VERSION")))
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn classify(&self, err: reqwest::Error) -> EngineError {
        if err.is_timeout() {
            EngineError::Timeout(self.request_timeout)
        } else if err.is_decode() || err.is_body() {
            EngineError::InvalidResponse(err.to_string())
        } else {
            EngineError::Unreachable(err.to_string())
        }
    }

    async fn put(&self, path: &str, doc: &Document, accept: &str) -> EngineResult<String> {
        let response = self
            .client
            .put(self.url(path))
            .header(ACCEPT, accept)
            .header(CONTENT_TYPE, doc.content_type())
            .body(doc.bytes.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        self.read_text(response).await
    }

    async fn get(&self, path: &str, accept: &str) -> EngineResult<String> {
        let response = self
            .client
            .get(self.url(path))
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        self.read_text(response).await
    }

    async fn read_text(&self, response: reqwest::Response) -> EngineResult<String> {
        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(EngineError::Status {
                status: status.as_u16(),
                body: truncate(text.trim(), MAX_ERROR_BODY),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl Engine for TikaEngine {
    async fn extract(&self, doc: &Document, markup: Markup) -> EngineResult<String> {
        observe("extract", self.put("/tika", doc, markup.accept())).await
    }

    async fn metadata(&self, doc: &Document) -> EngineResult<Metadata> {
        observe("metadata", async {
            let body = self.put("/meta", doc, "application/json").await?;
            match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(serde_json::Value::Object(map)) => Ok(map),
                Ok(other) => Err(EngineError::InvalidResponse(format!(
                    "expected a metadata object, got {}",
                    json_kind(&other)
                ))),
                Err(e) => Err(EngineError::InvalidResponse(e.to_string())),
            }
        })
        .await
    }

    async fn detect(&self, doc: &Document) -> EngineResult<String> {
        observe("detect", async {
            let body = self.put("/detect/stream", doc, "text/plain").await?;
            non_empty(body, "detect")
        })
        .await
    }

    async fn language(&self, doc: &Document) -> EngineResult<String> {
        observe("language", async {
            let body = self.put("/language/stream", doc, "text/plain").await?;
            non_empty(body, "language")
        })
        .await
    }

    async fn supported_types(&self) -> EngineResult<Vec<String>> {
        observe("types", async {
            let body = self.get("/mime-types", "application/json").await?;
            let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&body)
                .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
            let mut types: Vec<String> = map.into_iter().map(|(k, _)| k).collect();
            types.sort();
            Ok(types)
        })
        .await
    }

    async fn version(&self) -> EngineResult<String> {
        observe("version", async {
            let body = self.get("/version", "text/plain").await?;
            non_empty(body, "version")
        })
        .await
    }
}

async fn observe<T, F>(operation: &'static str, call: F) -> EngineResult<T>
where
    F: Future<Output = EngineResult<T>>,
{
    let start = Instant::now();
    let result = call.await;
    let outcome = match &result {
        Ok(_) => "success",
        Err(EngineError::Unreachable(_)) => "unreachable",
        Err(EngineError::Status { .. }) => "error_status",
        Err(EngineError::Timeout(_)) => "timeout",
        Err(EngineError::InvalidResponse(_)) => "invalid_response",
    };
    metrics::record_engine_call(operation, outcome, start);
    result
}

fn non_empty(body: String, what: &str) -> EngineResult<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        Err(EngineError::InvalidResponse(format!("empty {} response", what)))
    } else {
        Ok(trimmed.to_string())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
