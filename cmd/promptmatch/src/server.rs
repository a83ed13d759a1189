//! HTTP server for prompt matching.
//!
//! API endpoints:
//! - POST /api/match-prompt - Resolve {situation, level, file_type, data} to a prompt id
//! - GET  /health           - Liveness probe

use std::any::Any;
use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use promptmatch::{MatchError, PromptService};
use serde_json::{Value, json};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Shared handler state.
#[derive(Clone)]
struct AppState {
    service: PromptService,
}

/// Error returned by handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
enum ApiError {
    /// Content-Type is not JSON.
    ContentType,
    /// Body is not parseable JSON.
    InvalidJson,
    /// Request rejected by validation or matching.
    Match(MatchError),
    /// Unexpected failure; details are logged, never returned.
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::ContentType => "Content-Type must be application/json",
            ApiError::InvalidJson => "Invalid JSON format",
            ApiError::Match(e) => e.message(),
            ApiError::Internal => "Internal server error",
        }
    }
}

impl From<MatchError> for ApiError {
    fn from(e: MatchError) -> Self {
        ApiError::Match(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Build the application router.
pub fn app(service: PromptService) -> Router {
    with_layers(routes().with_state(AppState { service }))
}

fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/match-prompt",
            post(match_prompt).fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .fallback(not_found)
}

fn with_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server and run until Ctrl+C.
pub async fn start_server(addr: &str, service: PromptService) -> Result<()> {
    let title = service.config().api.title.clone();
    let addr = parse_addr(addr)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "{} listening", title);
    println!("Starting {} at http://{}", title, addr);
    println!("Available endpoints:");
    println!("  POST /api/match-prompt - Match prompts based on input criteria");
    println!("  GET  /health           - Health check");
    println!();

    axum::serve(listener, app(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Parse address string to SocketAddr. A bare `:port` binds all interfaces.
pub fn parse_addr(addr: &str) -> Result<SocketAddr> {
    let addr = if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    };
    Ok(addr.parse()?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}

/// Whether the Content-Type is `application/json` or `application/*+json`.
fn is_json(headers: &HeaderMap) -> bool {
    let Some(ct) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

async fn match_prompt(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if !is_json(&headers) {
        warn!("request without JSON content-type received");
        return Err(ApiError::ContentType);
    }

    let request: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "invalid JSON received");
        ApiError::InvalidJson
    })?;
    debug!(%request, "processing request");

    let matched = state.service.process(&request)?;
    Ok(Json(json!({
        "matched_prompt": matched,
        "status": "success",
    })))
}

async fn method_not_allowed(method: Method) -> impl IntoResponse {
    warn!(%method, "unsupported method on /api/match-prompt");
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed. Only POST requests are supported." })),
    )
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": state.service.config().api.title,
    }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Endpoint not found" })))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic"
    };
    error!(detail, "internal server error");
    ApiError::Internal.into_response()
}
