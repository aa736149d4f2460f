use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::SignInError;
use crate::config::{AuthEndpointsConfig, BackendConfig};
use crate::models::{RefreshedToken, Session, TokenResponse};
use crate::store::SessionStore;

#[derive(Deserialize, Serialize, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// Keep passwords out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sign-in and sign-out against the backend; the only writers besides refresh.
#[derive(Clone)]
pub struct AuthApi {
    http: reqwest::Client,
    login_url: String,
    logout_url: String,
    store: SessionStore,
}

impl AuthApi {
    pub fn new(
        http: reqwest::Client,
        backend: &BackendConfig,
        endpoints: &AuthEndpointsConfig,
        store: SessionStore,
    ) -> Self {
        AuthApi {
            http,
            login_url: backend.url(&endpoints.login_path),
            logout_url: backend.url(&endpoints.logout_path),
            store,
        }
    }

    /// Exchanges credentials for an access token and installs the new session.
    ///
    /// The backend also sets the refresh cookie, which lands in the shared jar.
    /// A rejected sign-in leaves the current session untouched.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, SignInError> {
        let response = self
            .http
            .post(&self.login_url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| SignInError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                event_name = "session.sign_in.rejected",
                event_domain = "session",
                username = credentials.username.as_str(),
                status = status.as_u16(),
                "sign-in rejected"
            );
            return Err(SignInError::Rejected { status, body });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| SignInError::InvalidResponse(e.to_string()))?;
        if body.access_token.is_empty() {
            return Err(SignInError::InvalidResponse(
                "empty access_token".to_string(),
            ));
        }

        self.store.apply(RefreshedToken::from(body));
        let session = self.store.snapshot();
        info!(
            event_name = "session.sign_in.succeeded",
            event_domain = "session",
            username = credentials.username.as_str(),
            user_id = session.user_id.as_str(),
            "signed in"
        );
        Ok(session)
    }

    /// Tells the backend to drop the refresh credential, then clears the session.
    ///
    /// The local session is cleared even when the backend call fails.
    pub async fn sign_out(&self) -> Session {
        let mut request = self.http.post(&self.logout_url);
        if let Some(token) = self.store.access_token() {
            request = request.bearer_auth(token);
        }
        match request.send().await {
            Ok(response) if !response.status().is_success() => {
                warn!("Logout endpoint answered {}", response.status());
            }
            Ok(_) => {}
            Err(e) => warn!("Logout request failed: {}", e),
        }

        self.store.clear();
        self.store.snapshot()
    }
}
