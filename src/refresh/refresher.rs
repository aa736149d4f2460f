use std::sync::Arc;

use tracing::{debug, info, warn};

use super::coalesce::CoalescingRefresher;
use super::error::AuthRefreshError;
use crate::config::{BackendConfig, RefreshConfig};
use crate::metrics::{Metrics, MetricsRecorder};
use crate::models::{RefreshedToken, TokenResponse};

/// Anything able to trade the ambient credential for a new access token.
#[async_trait::async_trait]
pub trait TokenRefresher: Send + Sync {
    fn get_name(&self) -> &str;
    async fn refresh(&self) -> Result<RefreshedToken, AuthRefreshError>;
}

/// Calls `POST <backend>/auth/refresh-token`.
///
/// The refresh credential is a cookie kept in the shared reqwest cookie jar,
/// so the request carries no explicit credentials of its own.
pub struct HttpTokenRefresher {
    http: reqwest::Client,
    url: String,
    metrics: Metrics,
}

impl HttpTokenRefresher {
    pub fn new(
        http: reqwest::Client,
        backend: &BackendConfig,
        config: &RefreshConfig,
        metrics: Metrics,
    ) -> Self {
        let url = backend.url(&config.path);
        info!("Creating token refresher for '{}'", url);
        HttpTokenRefresher { http, url, metrics }
    }

    async fn call_endpoint(&self) -> Result<RefreshedToken, AuthRefreshError> {
        debug!("Sending refresh request to: {}", self.url);
        let response = self
            .http
            .post(&self.url)
            .send()
            .await
            .map_err(|e| AuthRefreshError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthRefreshError::Rejected { status });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthRefreshError::InvalidResponse(e.to_string()))?;
        if body.access_token.is_empty() {
            return Err(AuthRefreshError::InvalidResponse(
                "empty access_token".to_string(),
            ));
        }

        Ok(RefreshedToken::from(body))
    }
}

#[async_trait::async_trait]
impl TokenRefresher for HttpTokenRefresher {
    fn get_name(&self) -> &str {
        "http-refresh"
    }

    async fn refresh(&self) -> Result<RefreshedToken, AuthRefreshError> {
        let result = self.call_endpoint().await;
        match &result {
            Ok(token) => {
                self.metrics.record_refresh_attempt("success");
                info!(
                    event_name = "refresh.succeeded",
                    event_domain = "refresh",
                    user_id = token.user_id.as_deref().unwrap_or_default(),
                    role_count = token.roles.as_ref().map_or(0, |roles| roles.len()),
                    "access token refreshed"
                );
            }
            Err(e) => {
                self.metrics.record_refresh_attempt("failure");
                warn!(
                    event_name = "refresh.failed",
                    event_domain = "refresh",
                    error = %e,
                    "access token refresh failed"
                );
            }
        }
        result
    }
}

/// Builds the refresher selected by `refresh.coalesce`.
pub fn create_refresher(
    http: reqwest::Client,
    backend: &BackendConfig,
    config: &RefreshConfig,
    metrics: Metrics,
) -> Arc<dyn TokenRefresher> {
    let refresher: Arc<dyn TokenRefresher> =
        Arc::new(HttpTokenRefresher::new(http, backend, config, metrics));
    if config.coalesce {
        info!("Concurrent refreshes will share one in-flight call.");
        Arc::new(CoalescingRefresher::new(refresher))
    } else {
        refresher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use mockito::Server;
    use std::collections::BTreeSet;

    fn refresher_for(server: &Server, metrics: Metrics) -> HttpTokenRefresher {
        HttpTokenRefresher::new(
            reqwest::Client::new(),
            &BackendConfig {
                base_url: server.url(),
            },
            &RefreshConfig::default(),
            metrics,
        )
    }

    #[tokio::test]
    async fn successful_refresh_returns_new_token() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/auth/refresh-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "fresh", "roles": [1, 2], "user_id": "u-1"}"#)
            .create_async()
            .await;

        let metrics = Metrics::new();
        let token = refresher_for(&server, metrics.clone())
            .refresh()
            .await
            .expect("refresh should succeed");
        m.assert_async().await;

        assert_eq!(token.access_token, "fresh");
        assert_eq!(token.roles, Some(BTreeSet::from([1, 2])));
        assert_eq!(token.user_id.as_deref(), Some("u-1"));
        assert!(
            metrics
                .render()
                .contains("panel_refresh_attempts_total{result=\"success\"} 1")
        );
    }

    #[tokio::test]
    async fn expired_cookie_is_rejected() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/auth/refresh-token")
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let result = refresher_for(&server, Metrics::new()).refresh().await;
        m.assert_async().await;
        assert_eq!(
            result,
            Err(AuthRefreshError::Rejected {
                status: StatusCode::UNAUTHORIZED
            })
        );
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/refresh-token")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let result = refresher_for(&server, Metrics::new()).refresh().await;
        assert!(matches!(result, Err(AuthRefreshError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn empty_token_is_invalid_response() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/refresh-token")
            .with_status(200)
            .with_body(r#"{"access_token": ""}"#)
            .create_async()
            .await;

        let result = refresher_for(&server, Metrics::new()).refresh().await;
        assert!(matches!(result, Err(AuthRefreshError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_reported() {
        let refresher = HttpTokenRefresher::new(
            reqwest::Client::new(),
            &BackendConfig {
                base_url: "http://127.0.0.1:1".to_string(),
            },
            &RefreshConfig::default(),
            Metrics::new(),
        );

        let result = refresher.refresh().await;
        assert!(matches!(result, Err(AuthRefreshError::Unreachable(_))));
    }
}
