use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub success: bool,
    pub format: String,
    pub content: Option<String>,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    pub content_length: usize,
    pub mime_type: String,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResult {
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageResult {
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypesResult {
    pub count: usize,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResult {
    pub status: String,
    pub engine_ready: bool,
    pub uptime_secs: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResult {
    pub version: String,
    pub service_version: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

/// Errors returned by [`GatewayClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or undecodable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The gateway answered with a non-success status.
    #[error("Gateway returned {status} {error}: {message}")]
    Api { status: u16, error: String, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

pub struct GatewayClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GatewayClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::builder().no_proxy().build().unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("X-API-Key", &self.api_key)
    }

    /// Extract `format` ("text", "html" or "metadata") from a document.
    pub async fn parse(&self, document: Vec<u8>, content_type: &str, format: &str) -> Result<ParseResult, ClientError> {
        let request = self
            .client
            .post(format!("{}/parse", self.base_url))
            .query(&[("format", format)])
            .header("Content-Type", content_type)
            .body(document);
        decode(self.authed(request).send().await?).await
    }

    pub async fn detect(&self, document: Vec<u8>) -> Result<DetectResult, ClientError> {
        let request = self.client.post(format!("{}/detect", self.base_url)).body(document);
        decode(self.authed(request).send().await?).await
    }

    pub async fn language(&self, document: Vec<u8>) -> Result<LanguageResult, ClientError> {
        let request = self.client.post(format!("{}/language", self.base_url)).body(document);
        decode(self.authed(request).send().await?).await
    }

    pub async fn types(&self) -> Result<TypesResult, ClientError> {
        let request = self.client.get(format!("{}/types", self.base_url));
        decode(self.authed(request).send().await?).await
    }

    /// Health is returned for both 200 and 503; the status field tells them apart.
    pub async fn health(&self) -> Result<HealthResult, ClientError> {
        let res = self.client.get(format!("{}/health", self.base_url)).send().await?;
        Ok(res.json().await?)
    }

    pub async fn version(&self) -> Result<VersionResult, ClientError> {
        decode(self.client.get(format!("{}/version", self.base_url)).send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json().await?);
    }

    let text = res.text().await?;
    let (error, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.error, body.message),
        Err(_) => (status.canonical_reason().unwrap_or("Error").to_string(), text),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        error,
        message,
    })
}
