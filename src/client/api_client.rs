use std::sync::Arc;
use std::time::{Duration, Instant};

use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::ClientError;
use super::request::RetryableRequest;
use crate::config::{BackendConfig, ClientConfig};
use crate::metrics::{Metrics, MetricsRecorder};
use crate::refresh::TokenRefresher;
use crate::store::SessionStore;
use crate::utils::log_throttle::LogThrottle;

const ANONYMOUS_LOG_WINDOW: Duration = Duration::from_secs(30);

/// Builds the transport shared by the client, the refresher and sign-in.
///
/// The cookie jar holds the refresh credential set by the backend at sign-in;
/// clones of the returned client share it.
pub fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_millis(config.timeout_in_ms))
        .build()
}

/// A fully read backend response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn error_for_status(self) -> Result<Self, ClientError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Status {
                status: self.status,
                content_type: self.headers.get(CONTENT_TYPE).cloned(),
                body: self.body,
            })
        }
    }
}

/// Sends requests to the panel backend on behalf of the current session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    backend: BackendConfig,
    store: SessionStore,
    refresher: Arc<dyn TokenRefresher>,
    metrics: Metrics,
    throttle: Arc<LogThrottle>,
}

impl ApiClient {
    pub fn new(
        http: reqwest::Client,
        backend: BackendConfig,
        store: SessionStore,
        refresher: Arc<dyn TokenRefresher>,
        metrics: Metrics,
    ) -> Self {
        info!(
            "Creating API client for '{}' using refresher '{}'",
            backend.base_url,
            refresher.get_name()
        );
        ApiClient {
            http,
            backend,
            store,
            refresher,
            metrics,
            throttle: Arc::new(LogThrottle::new(ANONYMOUS_LOG_WINDOW)),
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.send(RetryableRequest::new(Method::GET, path)).await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<ApiResponse, ClientError> {
        self.send(RetryableRequest::new(Method::POST, path).with_json(body)?)
            .await
    }

    pub async fn put<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<ApiResponse, ClientError> {
        self.send(RetryableRequest::new(Method::PUT, path).with_json(body)?)
            .await
    }

    pub async fn patch<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<ApiResponse, ClientError> {
        self.send(RetryableRequest::new(Method::PATCH, path).with_json(body)?)
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.send(RetryableRequest::new(Method::DELETE, path)).await
    }

    /// Sends `request`, refreshing the access token and retrying once on 401.
    ///
    /// A refresh failure clears the session before the error is returned. A
    /// 401 on the retried request is returned as [`ClientError::RetryExhausted`]
    /// without another refresh.
    pub async fn send(&self, request: RetryableRequest) -> Result<ApiResponse, ClientError> {
        let method = request.method().to_string();
        let started = Instant::now();

        let result = self.send_with_refresh(request).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(ClientError::AuthRefresh(_)) => "refresh_failed",
            Err(ClientError::RetryExhausted { .. }) => "unauthorized",
            Err(ClientError::Status { .. }) => "status",
            Err(ClientError::Network(_)) => "network",
            Err(_) => "invalid",
        };
        self.metrics
            .record_request_duration(&method, outcome, started.elapsed().as_secs_f64());
        result
    }

    async fn send_with_refresh(
        &self,
        mut request: RetryableRequest,
    ) -> Result<ApiResponse, ClientError> {
        let request_id = Uuid::new_v4().to_string();
        loop {
            let response = self.dispatch(&request, &request_id).await?;
            if response.status != StatusCode::UNAUTHORIZED {
                return response.error_for_status();
            }

            if request.is_retried() {
                self.metrics.record_request_retry("exhausted");
                warn!(
                    event_name = "client.retry.exhausted",
                    event_domain = "client",
                    request_id = request_id.as_str(),
                    path = request.path(),
                    "request still unauthorized after token refresh"
                );
                return Err(ClientError::RetryExhausted {
                    status: response.status,
                    body: response.body,
                });
            }

            debug!(
                request_id = request_id.as_str(),
                path = request.path(),
                "Received 401, refreshing access token"
            );
            let token = match self.refresher.refresh().await {
                Ok(token) => token,
                Err(e) => {
                    self.metrics.record_request_retry("refresh_failed");
                    self.store.clear();
                    return Err(ClientError::AuthRefresh(e));
                }
            };

            let access_token = token.access_token.clone();
            self.store.refresh_token(token);
            self.metrics.record_request_retry("retried");
            request = request.into_retry(&access_token)?;
        }
    }

    async fn dispatch(
        &self,
        request: &RetryableRequest,
        request_id: &str,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.backend.url(request.path());
        let mut builder = self
            .http
            .request(request.method().clone(), &url)
            .headers(request.headers().clone())
            .header("x-request-id", request_id);

        // A caller-supplied Authorization header always wins.
        if !request.has_authorization() {
            match self.store.access_token() {
                Some(token) => builder = builder.bearer_auth(token),
                None => {
                    if let Some(suppressed_count) = self.throttle.should_emit("client.anonymous")
                    {
                        debug!(
                            event_name = "client.anonymous",
                            event_domain = "client",
                            suppressed_count,
                            "sending request without an access token"
                        );
                    }
                }
            }
        }
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        debug!(
            request_id,
            method = %request.method(),
            path = request.path(),
            status = status.as_u16(),
            retried = request.is_retried(),
            "Backend responded"
        );
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
