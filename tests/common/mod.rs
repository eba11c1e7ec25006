//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use tika_gateway::config::GatewayConfig;
use tika_gateway::engine::{Document, Engine, EngineError, EngineResult, Markup, Metadata};
use tika_gateway::health::HealthState;
use tika_gateway::http::{create_router, AppState};

pub const API_KEY: &str = "test-secret";
pub const TIKA_VERSION: &str = "Apache Tika 2.9.1";

/// In-process engine that answers from the document bytes.
pub struct StubEngine {
    pub document_calls: AtomicUsize,
    pub version_calls: AtomicUsize,
    pub up: AtomicBool,
    pub delay: Duration,
    /// Metadata without a `Content-Type` entry.
    pub bare_metadata: bool,
    /// Document calls fail with this engine status.
    pub fail_status: Option<u16>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self {
            document_calls: AtomicUsize::new(0),
            version_calls: AtomicUsize::new(0),
            up: AtomicBool::new(true),
            delay: Duration::ZERO,
            bare_metadata: false,
            fail_status: None,
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new()
        }
    }

    pub fn without_content_type() -> Self {
        Self {
            bare_metadata: true,
            ..Self::new()
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::new()
        }
    }

    pub fn document_calls(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst)
    }

    async fn document_call(&self) -> EngineResult<()> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.fail_status {
            Some(status) => Err(EngineError::Status {
                status,
                body: "Unprocessable: encrypted document".to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn text_of(doc: &Document) -> String {
    String::from_utf8_lossy(&doc.bytes).into_owned()
}

#[async_trait]
impl Engine for StubEngine {
    async fn extract(&self, doc: &Document, markup: Markup) -> EngineResult<String> {
        self.document_call().await?;
        Ok(match markup {
            Markup::Plain => text_of(doc),
            Markup::Html => format!("<html><body><p>{}</p></body></html>", text_of(doc)),
        })
    }

    async fn metadata(&self, doc: &Document) -> EngineResult<Metadata> {
        self.document_call().await?;
        let mut value = json!({
            "X-TIKA:Parsed-By": ["org.apache.tika.parser.DefaultParser"],
            "Content-Length": doc.bytes.len().to_string(),
        });
        if !self.bare_metadata {
            value["Content-Type"] = json!(format!("{}; charset=UTF-8", doc.content_type()));
        }
        Ok(value.as_object().cloned().unwrap_or_default())
    }

    async fn detect(&self, doc: &Document) -> EngineResult<String> {
        self.document_call().await?;
        Ok(if doc.bytes.starts_with(b"%PDF") {
            "application/pdf".to_string()
        } else if std::str::from_utf8(&doc.bytes).is_ok() {
            "text/plain".to_string()
        } else {
            "application/octet-stream".to_string()
        })
    }

    async fn language(&self, _doc: &Document) -> EngineResult<String> {
        self.document_call().await?;
        Ok("en".to_string())
    }

    async fn supported_types(&self) -> EngineResult<Vec<String>> {
        self.document_call().await?;
        Ok(vec!["application/pdf".to_string(), "text/plain".to_string()])
    }

    async fn version(&self) -> EngineResult<String> {
        self.version_calls.fetch_add(1, Ordering::SeqCst);
        if self.up.load(Ordering::SeqCst) {
            Ok(TIKA_VERSION.to_string())
        } else {
            Err(EngineError::Unreachable("connection refused".to_string()))
        }
    }
}

pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.auth.api_key = API_KEY.to_string();
    config
}

/// Router over a stub engine. Returns the health handle so tests can flip readiness.
pub fn stub_app(engine: Arc<StubEngine>, config: &GatewayConfig, ready: bool) -> (Router, Arc<HealthState>) {
    let health = Arc::new(HealthState::new());
    if ready {
        health.mark_ready();
    }
    let state = AppState::new(config, engine, health.clone());
    (create_router(state, config), health)
}

pub fn post(uri: &str, key: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "text/plain");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(body.into()).unwrap()
}

pub fn get(uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        404 => "404 Not Found",
        415 => "415 Unsupported Media Type",
        422 => "422 Unprocessable Entity",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(request).await;
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text(status),
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Mock of the Tika server endpoints the gateway uses. `/version` answers
/// 503 while `up` is false.
pub async fn start_mock_tika(up: Arc<AtomicBool>) -> SocketAddr {
    start_programmable_backend(move |req: RecordedRequest| {
        let up = up.clone();
        async move {
            let text = String::from_utf8_lossy(&req.body).into_owned();
            match (req.method.as_str(), req.path.as_str()) {
                ("GET", "/version") if up.load(Ordering::SeqCst) => (200, TIKA_VERSION.to_string()),
                ("GET", "/version") => (503, "starting".to_string()),
                ("PUT", "/tika") if req.header("accept") == Some("text/html") => {
                    (200, format!("<html><body><p>{}</p></body></html>", text))
                }
                ("PUT", "/tika") => (200, text),
                ("PUT", "/meta") => (
                    200,
                    json!({ "Content-Type": "text/plain; charset=UTF-8", "dc:title": "Greeting" }).to_string(),
                ),
                ("PUT", "/detect/stream") => (200, "text/plain".to_string()),
                ("PUT", "/language/stream") => (200, "en".to_string()),
                ("GET", "/mime-types") => (
                    200,
                    json!({
                        "text/plain": { "supertype": "application/octet-stream" },
                        "application/pdf": { "supertype": "application/octet-stream" }
                    })
                    .to_string(),
                ),
                _ => (404, "not found".to_string()),
            }
        }
    })
    .await
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
