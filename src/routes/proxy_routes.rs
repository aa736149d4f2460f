//! Forwards `/api/*` to the backend through the authenticated client.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::any};
use serde_json::Value;

use crate::client::{ClientError, RetryableRequest};
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/{*path}", any(forward))
}

async fn forward(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Response, HTTPError> {
    let body = if body.is_empty() {
        None
    } else {
        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            HTTPError::new(
                StatusCode::BAD_REQUEST,
                format!("Request body is not JSON: {}", e),
            )
        })?;
        Some(value)
    };

    let request = RetryableRequest::new(method, format!("/{}", path))
        .with_query(query)
        .with_body(body);
    match state.client.send(request).await {
        Ok(response) => {
            let content_type = response.headers.get(CONTENT_TYPE).cloned();
            Ok(passthrough(response.status, content_type, response.body))
        }
        // Backend errors reach the caller as the backend wrote them.
        Err(ClientError::Status {
            status,
            content_type,
            body,
        }) => Ok(passthrough(status, content_type, body)),
        Err(e) => Err(e.into()),
    }
}

fn passthrough(status: StatusCode, content_type: Option<HeaderValue>, body: String) -> Response {
    let mut forwarded = (status, body).into_response();
    if let Some(content_type) = content_type {
        forwarded.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    forwarded
}
