use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::client::{ClientError, SignInError};
use crate::models::RoleRequirementError;

/// A general purpose HTTP error type that can be converted into an `IntoResponse`.
#[derive(Debug)]
pub struct HTTPError {
    status: StatusCode,
    message: String,
}

impl HTTPError {
    /// Creates a new HTTP error with the given status code and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HTTPError {
            status,
            message: message.into(),
        }
    }
}

/// Converts our `HTTPError` into a JSON error response.
impl IntoResponse for HTTPError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ClientError> for HTTPError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::AuthRefresh(_) => HTTPError::new(
                StatusCode::UNAUTHORIZED,
                "Session expired, sign in again",
            ),
            ClientError::RetryExhausted { status, .. } => {
                HTTPError::new(status, "Unauthorized access")
            }
            ClientError::Status { status, body, .. } => HTTPError::new(status, body),
            ClientError::Network(msg) => HTTPError::new(StatusCode::BAD_GATEWAY, msg),
            ClientError::InvalidRequest(msg) => HTTPError::new(StatusCode::BAD_REQUEST, msg),
            ClientError::Decode(msg) => HTTPError::new(StatusCode::BAD_GATEWAY, msg),
        }
    }
}

impl From<SignInError> for HTTPError {
    fn from(e: SignInError) -> Self {
        match e {
            SignInError::Rejected { status, .. } if status.is_client_error() => {
                HTTPError::new(StatusCode::UNAUTHORIZED, "Invalid credentials")
            }
            other => HTTPError::new(StatusCode::BAD_GATEWAY, other.to_string()),
        }
    }
}

impl From<RoleRequirementError> for HTTPError {
    fn from(e: RoleRequirementError) -> Self {
        HTTPError::new(StatusCode::BAD_REQUEST, e.to_string())
    }
}
