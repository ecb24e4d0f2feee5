mod config;
mod extract;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use hydro_agents::BriefingAgent;
use hydro_core::{BriefingError, BriefingInput, BriefingReply, BriefingRequest};
use hydro_observability::{AppMetrics, MetricsSnapshot};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use crate::config::{ApiConfig, ConfigError, DEFAULT_PORT};
pub use crate::extract::JsonOrForm;

pub const SERVICE_NAME: &str = "hydro-briefing";
const EMPTY_QUERY_MESSAGE: &str = "查询文本不能为空";
const ENDPOINTS: &[&str] = &[
    "GET /health",
    "POST /api/briefing",
    "POST /api/briefing/local",
    "POST /api/briefing/generate",
];

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<BriefingAgent>,
    pub metrics: Arc<AppMetrics>,
    pub config: Arc<ApiConfig>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp_utc: String,
    metrics: MetricsSnapshot,
}

pub fn build_app(config: ApiConfig) -> Router {
    let metrics = AppMetrics::shared();
    let agent = Arc::new(BriefingAgent::new(metrics.clone()));

    build_router(ApiState {
        agent,
        metrics,
        config: Arc::new(config),
    })
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/briefing", post(briefing))
        .route("/api/briefing/local", post(briefing_local))
        .route("/api/briefing/generate", post(briefing_generate))
        .fallback(not_found)
        .layer(build_cors_layer(&state.config.allowed_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        // Propagate sits inside Set so generated ids reach the response too.
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(state.config.body_limit_bytes))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

/// Always answers 200; a missing question is signalled through `ok: false`.
async fn briefing(
    State(state): State<ApiState>,
    JsonOrForm(request): JsonOrForm<BriefingRequest>,
) -> Json<BriefingReply> {
    Json(state.agent.answer(request.q.as_deref()))
}

async fn briefing_local(
    State(state): State<ApiState>,
    JsonOrForm(request): JsonOrForm<BriefingRequest>,
) -> Response {
    match state.agent.answer_local(request.q.as_deref()) {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(BriefingError::EmptyQuery) => {
            error_response(StatusCode::BAD_REQUEST, "empty_query", EMPTY_QUERY_MESSAGE)
        }
        Err(error) => {
            tracing::error!(error = %error, "local briefing lookup failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "briefing_failed",
                &error.to_string(),
            )
        }
    }
}

async fn briefing_generate(
    State(state): State<ApiState>,
    JsonOrForm(input): JsonOrForm<BriefingInput>,
) -> Response {
    (StatusCode::OK, Json(state.agent.generate(&input))).into_response()
}

async fn not_found(method: Method, uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "not_found",
            "message": format!("no route for {} {}", method, uri.path()),
            "available_endpoints": ENDPOINTS,
        })),
    )
        .into_response()
}

fn error_response(status: StatusCode, error: &str, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": error,
            "message": message,
        })),
    )
        .into_response()
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Credentials cannot be combined with a wildcard origin.
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'; base-uri 'none'"),
    );

    response
}
