#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, Response};
use jsonwebtoken::{EncodingKey, Header, encode};
use panelauth::config::{ConfigV1, parse_config};
use panelauth::routes::create_router;
use panelauth::startup::build_state;
use panelauth::state::AppState;
use serde_json::Value;

pub fn test_config(base_url: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
logging:
  level: "warn"
  format: "json"
backend:
  base_url: "{base_url}"
client:
  timeout_in_ms: 3000
bind_address: 127.0.0.1:7071
"#
    );
    parse_config(&yaml).expect("Failed to parse test config YAML")
}

pub fn build_app(config: ConfigV1) -> (Router, AppState) {
    let state = build_state(Arc::new(config)).expect("state should build");
    (create_router(state.clone()), state)
}

pub fn get_request(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn json_request(method: Method, path: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).expect("body should be JSON")
}

/// An access token shaped like the backend's: HS256 JWT with `sub` and `roles`.
pub fn access_token(sub: &str, roles: &[i32]) -> String {
    let claims = serde_json::json!({ "sub": sub, "roles": roles, "exp": 4_102_444_800i64 });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .expect("Failed to encode JWT")
}
