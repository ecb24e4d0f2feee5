//! Request helpers shared by the HTTP integration tests.

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, Response, StatusCode};
use axum::Router;
use hydro_api::{build_app, ApiConfig};
use serde_json::Value;
use tower::ServiceExt;

pub fn app() -> Router {
    build_app(ApiConfig::default())
}

pub fn app_with_origins(origins: &[&str]) -> Router {
    build_app(ApiConfig {
        allowed_origins: origins.iter().map(|origin| origin.to_string()).collect(),
        ..ApiConfig::default()
    })
}

pub fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn form_post(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response: Response<Body> = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, parsed)
}

pub async fn send_for_headers(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap) {
    let response: Response<Body> = app.oneshot(request).await.unwrap();
    (response.status(), response.headers().clone())
}
