//! Router-level tests against a stub engine.

use axum::http::StatusCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use tika_gateway::http::X_REQUEST_ID;

mod common;
use common::{get, json_body, post, stub_app, test_config, StubEngine, API_KEY, TIKA_VERSION};

const DOC: &str = "Hello from a plain text document. Grüße!";

#[tokio::test]
async fn test_missing_key_is_rejected_without_engine_call() {
    let engine = Arc::new(StubEngine::new());
    let (app, _) = stub_app(engine.clone(), &test_config(), true);

    let requests = vec![
        post("/parse", None, DOC),
        post("/detect", None, DOC),
        post("/language", None, DOC),
        get("/types", None),
    ];

    for request in requests {
        let uri = request.uri().to_string();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);

        let body = json_body(response).await;
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["message"], "Missing X-API-Key header");
    }

    assert_eq!(engine.document_calls(), 0);
}

#[tokio::test]
async fn test_wrong_key_leaks_nothing() {
    let engine = Arc::new(StubEngine::new());
    let (app, _) = stub_app(engine.clone(), &test_config(), true);

    let response = app
        .oneshot(post("/parse", Some("not-the-secret"), DOC))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("Invalid API key"));
    assert!(!text.contains("Hello from"), "document content must not leak: {}", text);
    assert_eq!(engine.document_calls(), 0);
}

#[tokio::test]
async fn test_parse_text_returns_content_and_length() {
    let engine = Arc::new(StubEngine::new());
    let (app, _) = stub_app(engine, &test_config(), true);

    let response = app.oneshot(post("/parse", Some(API_KEY), DOC)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["format"], "text");
    assert_eq!(body["content"], DOC);
    assert_eq!(body["content_length"], DOC.chars().count());
    assert_eq!(body["mime_type"], "text/plain");
    assert!(body.get("metadata").is_none());
    assert!(body["processing_time_ms"].is_u64());
}

#[tokio::test]
async fn test_parse_html_shape() {
    let engine = Arc::new(StubEngine::new());
    let (app, _) = stub_app(engine, &test_config(), true);

    let response = app
        .oneshot(post("/parse?format=html", Some(API_KEY), DOC))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["format"], "html");
    let content = body["content"].as_str().unwrap();
    assert!(content.starts_with("<html>"));
    assert!(content.contains(DOC));
    assert_eq!(body["content_length"], content.chars().count());
    assert!(body.get("metadata").is_none());
}

#[tokio::test]
async fn test_parse_metadata_shape() {
    let engine = Arc::new(StubEngine::new());
    let (app, _) = stub_app(engine, &test_config(), true);

    let response = app
        .oneshot(post("/parse?format=metadata", Some(API_KEY), DOC))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["format"], "metadata");
    assert!(body.get("content").is_none());
    assert!(body["metadata"].is_object());
    assert_eq!(body["metadata"]["X-TIKA:Parsed-By"][0], "org.apache.tika.parser.DefaultParser");
    assert_eq!(body["mime_type"], "text/plain");
    assert!(body["content_length"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_parse_rejects_unknown_format() {
    let engine = Arc::new(StubEngine::new());
    let (app, _) = stub_app(engine.clone(), &test_config(), true);

    let response = app
        .oneshot(post("/parse?format=pdf", Some(API_KEY), DOC))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Bad Request");
    assert!(body["message"].as_str().unwrap().contains("pdf"));
    assert_eq!(engine.document_calls(), 0);
}

#[tokio::test]
async fn test_empty_body_is_bad_request() {
    let engine = Arc::new(StubEngine::new());
    let (app, _) = stub_app(engine.clone(), &test_config(), true);

    for uri in ["/parse", "/detect", "/language"] {
        let response = app.clone().oneshot(post(uri, Some(API_KEY), "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let body = json_body(response).await;
        assert!(body["message"].as_str().unwrap().contains("No file data"));
    }
    assert_eq!(engine.document_calls(), 0);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let engine = Arc::new(StubEngine::new());
    let mut config = test_config();
    config.limits.max_body_bytes = 16;
    let (app, _) = stub_app(engine.clone(), &config, true);

    let response = app
        .oneshot(post("/detect", Some(API_KEY), "x".repeat(64)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(response).await["error"], "Payload Too Large");
    assert_eq!(engine.document_calls(), 0);
}

#[tokio::test]
async fn test_protected_routes_wait_for_readiness() {
    let engine = Arc::new(StubEngine::new());
    let (app, health) = stub_app(engine.clone(), &test_config(), false);

    let response = app.clone().oneshot(post("/parse", Some(API_KEY), DOC)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("still starting"));
    assert_eq!(engine.document_calls(), 0);

    health.mark_ready();
    let response = app.oneshot(post("/parse", Some(API_KEY), DOC)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_reflects_readiness() {
    let engine = Arc::new(StubEngine::new());
    let (app, health) = stub_app(engine, &test_config(), false);

    let response = app.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["status"], "STARTING");
    assert_eq!(body["engine_ready"], false);

    health.mark_ready();

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "READY");
    assert_eq!(body["engine_ready"], true);
    assert!(body["uptime_secs"].is_u64());
    assert!(body["timestamp"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_version_is_stable_and_fetched_once() {
    let engine = Arc::new(StubEngine::new());
    let (app, _) = stub_app(engine.clone(), &test_config(), false);

    let mut versions = Vec::new();
    for _ in 0..3 {
        let response = app.clone().oneshot(get("/version", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        versions.push(json_body(response).await["version"].clone());
    }

    assert!(versions.iter().all(|v| v == TIKA_VERSION));
    assert_eq!(engine.version_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_version_unavailable_while_engine_down() {
    let engine = Arc::new(StubEngine::new());
    engine.up.store(false, Ordering::SeqCst);
    let (app, _) = stub_app(engine.clone(), &test_config(), false);

    let response = app.clone().oneshot(get("/version", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["error"], "Service Unavailable");

    engine.up.store(true, Ordering::SeqCst);
    let response = app.oneshot(get("/version", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_detect_is_idempotent() {
    let engine = Arc::new(StubEngine::new());
    let (app, _) = stub_app(engine, &test_config(), true);
    let pdf = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n".to_vec();

    let mut seen = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post("/detect", Some(API_KEY), pdf.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        seen.push(json_body(response).await["mime_type"].clone());
    }

    assert_eq!(seen[0], "application/pdf");
    assert_eq!(seen[0], seen[1]);
}

#[tokio::test]
async fn test_language_and_types() {
    let engine = Arc::new(StubEngine::new());
    let (app, _) = stub_app(engine, &test_config(), true);

    let response = app.clone().oneshot(post("/language", Some(API_KEY), DOC)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["language"], "en");

    let response = app.oneshot(get("/types", Some(API_KEY))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["types"][0], "application/pdf");
}

#[tokio::test]
async fn test_slow_engine_times_out() {
    let engine = Arc::new(StubEngine::slow(Duration::from_secs(5)));
    let mut config = test_config();
    config.timeouts.request_secs = 1;
    let (app, _) = stub_app(engine, &config, true);

    let response = app.oneshot(post("/detect", Some(API_KEY), DOC)).await.unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Gateway Timeout");
    assert!(body["message"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_public_routes_need_no_key() {
    let engine = Arc::new(StubEngine::new());
    let (app, _) = stub_app(engine, &test_config(), false);

    let response = app.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "running");
    assert_eq!(body["engine_ready"], false);
    assert_eq!(body["usage"]["formats"][2], "metadata");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let engine = Arc::new(StubEngine::new());
    let (app, _) = stub_app(engine, &test_config(), true);

    let response = app.oneshot(get("/nope", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "Not Found");
}

#[tokio::test]
async fn test_request_id_is_assigned_and_echoed() {
    let engine = Arc::new(StubEngine::new());
    let (app, _) = stub_app(engine, &test_config(), true);

    let response = app.clone().oneshot(get("/health", None)).await.unwrap();
    let generated = response.headers().get(X_REQUEST_ID).expect("request id assigned");
    assert_eq!(generated.to_str().unwrap().len(), 36);

    let mut request = get("/health", None);
    request
        .headers_mut()
        .insert(X_REQUEST_ID, "caller-chosen-id".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()[X_REQUEST_ID], "caller-chosen-id");
}

#[tokio::test]
async fn test_metadata_without_content_type_falls_back_to_detect() {
    let engine = Arc::new(StubEngine::without_content_type());
    let (app, _) = stub_app(engine.clone(), &test_config(), true);

    let response = app
        .oneshot(post("/parse?format=metadata", Some(API_KEY), DOC))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["metadata"].get("Content-Type").is_none());
    assert_eq!(body["mime_type"], "text/plain");
    assert_eq!(engine.document_calls(), 2);
}

#[tokio::test]
async fn test_metadata_fallback_shares_one_deadline() {
    // Each call fits the deadline alone, both together do not.
    let engine = Arc::new(StubEngine {
        delay: Duration::from_millis(700),
        ..StubEngine::without_content_type()
    });
    let mut config = test_config();
    config.timeouts.request_secs = 1;
    let (app, _) = stub_app(engine, &config, true);

    let started = std::time::Instant::now();
    let response = app
        .oneshot(post("/parse?format=metadata", Some(API_KEY), DOC))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(started.elapsed() < Duration::from_millis(1400));

    let body = json_body(response).await;
    assert_eq!(body["error"], "Gateway Timeout");
    assert!(body["message"].as_str().unwrap().contains("timed out after 1s"));
}

#[tokio::test]
async fn test_engine_failure_is_bad_gateway() {
    let engine = Arc::new(StubEngine::failing(422));
    let (app, _) = stub_app(engine, &test_config(), true);

    let response = app.oneshot(post("/parse", Some(API_KEY), DOC)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Bad Gateway");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("422"), "{}", message);
    assert!(message.contains("encrypted"), "{}", message);
}

#[tokio::test]
async fn test_wrong_method_is_json_405() {
    let engine = Arc::new(StubEngine::new());
    let (app, _) = stub_app(engine.clone(), &test_config(), true);

    let response = app.oneshot(get("/parse", Some(API_KEY))).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json_body(response).await["error"], "Method Not Allowed");
    assert_eq!(engine.document_calls(), 0);
}
