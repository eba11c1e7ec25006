//! Engine-facing types and error definitions.

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Content type forwarded when the caller did not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A document as received from the caller. Never written to disk.
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl Document {
    pub fn new(bytes: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
        }
    }

    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Output requested from `/parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
    Metadata,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Html => "html",
            OutputFormat::Metadata => "metadata",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "html" => Ok(OutputFormat::Html),
            "metadata" => Ok(OutputFormat::Metadata),
            other => Err(format!(
                "Unsupported format '{}'; expected one of text, html, metadata",
                other
            )),
        }
    }
}

/// Markup flavour for content extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Plain,
    Html,
}

impl Markup {
    pub fn accept(&self) -> &'static str {
        match self {
            Markup::Plain => "text/plain",
            Markup::Html => "text/html",
        }
    }
}

/// Metadata field name → value as reported by the engine.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Errors that can occur while talking to the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Connection refused, DNS failure, reset.
    #[error("Engine unreachable: {0}")]
    Unreachable(String),

    /// The engine answered with a non-success status.
    #[error("Engine returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The call exceeded its deadline.
    #[error("Engine call timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The engine answered 2xx with something we could not interpret.
    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
