use http::StatusCode;
use thiserror::Error;

/// Why a refresh did not produce a token. The session is cleared on any of these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthRefreshError {
    /// The endpoint answered non-2xx: refresh cookie absent, expired or revoked.
    #[error("refresh rejected with status {status}")]
    Rejected { status: StatusCode },
    #[error("refresh endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("invalid refresh response: {0}")]
    InvalidResponse(String),
}
