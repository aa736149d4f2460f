//! Shared application state.
//!
//! Everything here points at the one process-wide session.

use crate::client::{ApiClient, AuthApi};
use crate::guard::RouteGuard;
use crate::metrics::Metrics;
use crate::store::SessionStore;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The single authoritative session.
    pub store: SessionStore,
    /// Authenticated client used by the `/api` proxy.
    pub client: ApiClient,
    pub auth_api: AuthApi,
    pub guard: Arc<RouteGuard>,
    pub metrics: Metrics,
}
