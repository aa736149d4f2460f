//! Sign-in, sign-out and the session projection.

use axum::extract::State;
use axum::{Json, Router, routing::get, routing::post};

use crate::client::Credentials;
use crate::models::SessionProjection;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(current_session))
        .route("/session/login", post(sign_in))
        .route("/session/logout", post(sign_out))
}

async fn current_session(State(state): State<AppState>) -> Json<SessionProjection> {
    Json(state.store.snapshot().projection())
}

async fn sign_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<SessionProjection>, HTTPError> {
    let session = state.auth_api.sign_in(&credentials).await?;
    Ok(Json(session.projection()))
}

async fn sign_out(State(state): State<AppState>) -> Json<SessionProjection> {
    Json(state.auth_api.sign_out().await.projection())
}
