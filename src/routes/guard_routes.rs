//! Route guard decisions for the navigation layer.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use serde::Deserialize;

use crate::guard::GuardResolution;
use crate::models::RoleRequirement;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

pub fn routes() -> Router<AppState> {
    Router::new().route("/guard", get(resolve_guard))
}

#[derive(Deserialize)]
struct GuardQuery {
    /// The location the user is navigating to.
    path: String,
    /// Comma separated role ids allowed on that location.
    roles: String,
}

/// `GET /guard?path=/exams&roles=1,3`
async fn resolve_guard(
    State(state): State<AppState>,
    Query(query): Query<GuardQuery>,
) -> Result<Json<GuardResolution>, HTTPError> {
    let requirement: RoleRequirement = query.roles.parse()?;
    Ok(Json(state.guard.resolve(&requirement, &query.path).await))
}
