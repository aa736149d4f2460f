//! HTTP route definitions and handlers.
//!
//! The navigation layer talks to the agent through these groups:
//! session, guard, the backend proxy, and status endpoints.

mod guard_routes;
mod proxy_routes;
mod session_routes;
mod status_routes;

use crate::state::AppState;
use axum::Router;

/// Creates the application router with all configured routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(session_routes::routes())
        .merge(guard_routes::routes())
        .merge(proxy_routes::routes())
        .merge(status_routes::routes())
        .with_state(state)
}
