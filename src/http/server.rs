//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with public and protected routes
//! - Wire up middleware (request ID, tracing, body limit, timeout, metrics)
//! - Start the readiness monitor and, if configured, the engine process
//! - Serve until shutdown

use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    http::{header::ALLOW, header::CONTENT_TYPE, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::engine::{Engine, EngineProcess};
use crate::health::{HealthState, ReadinessMonitor};
use crate::http::error::ApiError;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::lifecycle::shutdown::{wait_for, Shutdown};
use crate::observability::metrics;
use crate::security::{limits::body_limit, require_api_key, ApiKey};

/// Grace on top of the engine deadline before the router gives up on a request.
const ROUTER_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn Engine>,
    pub health: Arc<HealthState>,
    pub api_key: ApiKey,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(config: &GatewayConfig, engine: Arc<dyn Engine>, health: Arc<HealthState>) -> Self {
        Self {
            engine,
            health,
            api_key: ApiKey::new(&config.auth.api_key),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        }
    }
}

/// Build the Axum router with all middleware layers.
pub fn create_router(state: AppState, config: &GatewayConfig) -> Router {
    let protected = Router::new()
        .route("/parse", post(handlers::parse))
        .route("/detect", post(handlers::detect))
        .route("/language", post(handlers::language))
        .route("/types", get(handlers::types))
        .route_layer(middleware::from_fn_with_state(
            state.api_key.clone(),
            require_api_key,
        ));

    let router_timeout = state.request_timeout + ROUTER_TIMEOUT_GRACE;

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        .merge(protected)
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(track_request))
        .layer(body_limit(&config.limits))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            router_timeout,
        ))
        .layer(middleware::map_response_with_state(
            router_timeout,
            json_error_bodies,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(propagate_request_id_layer()),
        )
}

async fn track_request(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&route, response.status().as_u16(), start);
    response
}

/// Give bodiless error responses produced by the framework or by tower
/// layers the same JSON shape as handler errors.
async fn json_error_bodies(State(router_timeout): State<Duration>, response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error())
        || response.headers().contains_key(CONTENT_TYPE)
    {
        return response;
    }

    let error = match status {
        StatusCode::METHOD_NOT_ALLOWED => {
            ApiError::MethodNotAllowed("Method not allowed for this route".to_string())
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ApiError::Timeout(format!(
            "Request timed out after {}s",
            router_timeout.as_secs()
        )),
        s if s.is_server_error() => ApiError::Internal(
            s.canonical_reason().unwrap_or("Internal error").to_string(),
        ),
        _ => return response,
    };

    let allow = response.headers().get(ALLOW).cloned();
    let mut json = error.into_response();
    if let Some(allow) = allow {
        json.headers_mut().insert(ALLOW, allow);
    }
    json
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    state: AppState,
}

impl GatewayServer {
    /// Create a new server around an engine.
    pub fn new(config: GatewayConfig, engine: Arc<dyn Engine>) -> Self {
        let health = Arc::new(HealthState::new());
        let state = AppState::new(&config, engine, health);
        let router = create_router(state.clone(), &config);

        Self {
            router,
            config,
            state,
        }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if !self.config.engine.command.is_empty() {
            match EngineProcess::spawn(&self.config.engine.command) {
                Ok(process) => {
                    let health = self.state.health.clone();
                    tokio::spawn(process.supervise(health, shutdown.subscribe()));
                }
                Err(e) => {
                    tracing::error!(
                        command = ?self.config.engine.command,
                        error = %e,
                        "Failed to start engine process"
                    );
                }
            }
        }

        let monitor = ReadinessMonitor::new(
            self.state.engine.clone(),
            self.state.health.clone(),
            self.config.health_check.clone(),
        );
        tokio::spawn(monitor.run(shutdown.subscribe()));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown.subscribe()))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
