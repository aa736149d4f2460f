//! Agent startup and server initialization.
//!
//! Wires the session store, refresher, client and guard together around one
//! shared HTTP transport, then serves the navigation-facing routes.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::client::{ApiClient, AuthApi, build_http_client};
use crate::config::ConfigV1;
use crate::guard::RouteGuard;
use crate::metrics::Metrics;
use crate::refresh::create_refresher;
use crate::routes;
use crate::state::AppState;
use crate::store::SessionStore;

/// Builds the application state from configuration.
///
/// # Errors
///
/// Returns an error if the HTTP transport cannot be constructed.
pub fn build_state(config: Arc<ConfigV1>) -> Result<AppState, reqwest::Error> {
    let metrics = Metrics::new();
    let http = build_http_client(&config.client)?;
    let store = SessionStore::new();

    let refresher = create_refresher(
        http.clone(),
        &config.backend,
        &config.refresh,
        metrics.clone(),
    );
    let client = ApiClient::new(
        http.clone(),
        config.backend.clone(),
        store.clone(),
        refresher.clone(),
        metrics.clone(),
    );
    let auth_api = AuthApi::new(http, &config.backend, &config.auth, store.clone());
    let guard = Arc::new(RouteGuard::new(
        config.guard.clone(),
        store.clone(),
        refresher,
        metrics.clone(),
    ));

    Ok(AppState {
        store,
        client,
        auth_api,
        guard,
        metrics,
    })
}

/// Initializes and runs the session agent.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address
/// or encounters a runtime error during execution.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(config.clone())?;
    let app = routes::create_router(state);

    info!(
        "Starting session agent on {} for backend {}",
        config.bind_address, config.backend.base_url
    );
    let listener = TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
