use http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use serde::Serialize;
use serde_json::Value;

use super::error::ClientError;

/// How many times a request may be re-issued after a token refresh.
pub const MAX_AUTH_RETRIES: u8 = 1;

/// An outgoing API call that carries its own retry state.
///
/// Retrying consumes the value and returns a new one with the attempt counter
/// advanced, so there is no flag to flip on a shared descriptor.
#[derive(Debug, Clone)]
pub struct RetryableRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Value>,
    auth_retries: u8,
}

impl RetryableRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        RetryableRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            auth_retries: 0,
        }
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        let value =
            serde_json::to_value(body).map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn has_authorization(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }

    /// True once the request has used up its refresh-and-retry.
    pub fn is_retried(&self) -> bool {
        self.auth_retries >= MAX_AUTH_RETRIES
    }

    /// The same request, marked as retried and authorized with `access_token`.
    pub fn into_retry(mut self, access_token: &str) -> Result<Self, ClientError> {
        let value = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        self.headers.insert(AUTHORIZATION, value);
        self.auth_retries += 1;
        Ok(self)
    }
}
