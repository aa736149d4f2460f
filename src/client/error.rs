use http::{HeaderValue, StatusCode};
use thiserror::Error;

use crate::refresh::AuthRefreshError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The 401 triggered a refresh which failed; the session has been cleared.
    #[error(transparent)]
    AuthRefresh(#[from] AuthRefreshError),
    /// The request was retried once with a fresh token and still got 401.
    #[error("request still unauthorized after token refresh ({status})")]
    RetryExhausted { status: StatusCode, body: String },
    #[error("unexpected status {status}")]
    Status {
        status: StatusCode,
        content_type: Option<HeaderValue>,
        body: String,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("could not decode response body: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum SignInError {
    #[error("sign-in rejected with status {status}")]
    Rejected { status: StatusCode, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid sign-in response: {0}")]
    InvalidResponse(String),
}
