use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::GuardConfig;
use crate::metrics::{Metrics, MetricsRecorder};
use crate::models::{RoleRequirement, Session};
use crate::refresh::TokenRefresher;
use crate::store::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    /// The session has not been checked yet (silent refresh may be pending).
    Unresolved,
    Authorized,
    Denied,
}

impl GuardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardState::Unresolved => "unresolved",
            GuardState::Authorized => "authorized",
            GuardState::Denied => "denied",
        }
    }
}

/// What the navigation layer should do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Show a loading placeholder.
    Loading,
    /// Show the protected view.
    Render,
    /// Navigate to `to`; `from` is the location to return to after sign-in.
    Redirect { to: String, from: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardResolution {
    pub state: GuardState,
    pub decision: GuardDecision,
}

impl GuardResolution {
    pub fn pending() -> Self {
        GuardResolution {
            state: GuardState::Unresolved,
            decision: GuardDecision::Loading,
        }
    }
}

/// Pure role check. Authorized only with a token and an intersecting role set.
pub fn evaluate(session: &Session, requirement: &RoleRequirement) -> GuardState {
    if session.is_authenticated() && requirement.is_satisfied_by(&session.roles) {
        GuardState::Authorized
    } else {
        GuardState::Denied
    }
}

pub struct RouteGuard {
    config: GuardConfig,
    store: SessionStore,
    refresher: Arc<dyn TokenRefresher>,
    metrics: Metrics,
}

impl RouteGuard {
    pub fn new(
        config: GuardConfig,
        store: SessionStore,
        refresher: Arc<dyn TokenRefresher>,
        metrics: Metrics,
    ) -> Self {
        RouteGuard {
            config,
            store,
            refresher,
            metrics,
        }
    }

    /// Runs the guard for a navigation to `location`.
    ///
    /// With no access token a silent refresh is tried first; the caller shows
    /// [`GuardResolution::pending`] until this future completes.
    pub async fn resolve(&self, requirement: &RoleRequirement, location: &str) -> GuardResolution {
        let mut session = self.store.snapshot();
        if !session.is_authenticated() {
            debug!("No access token for '{}', attempting silent refresh", location);
            match self.refresher.refresh().await {
                Ok(token) => self.store.refresh_token(token),
                Err(e) => {
                    debug!("Silent refresh failed: {}", e);
                    self.store.clear();
                }
            }
            session = self.store.snapshot();
        }

        let resolution = self.decide(&session, requirement, location);
        self.metrics.record_guard_decision(resolution.state.as_str());
        info!(
            event_name = "guard.resolved",
            event_domain = "guard",
            location,
            state = resolution.state.as_str(),
            user_id = session.user_id.as_str(),
            "route guard resolved"
        );
        resolution
    }

    fn decide(
        &self,
        session: &Session,
        requirement: &RoleRequirement,
        location: &str,
    ) -> GuardResolution {
        let state = evaluate(session, requirement);
        let decision = match state {
            GuardState::Authorized => GuardDecision::Render,
            GuardState::Denied if session.is_authenticated() => GuardDecision::Redirect {
                to: self.config.unauthorized_path.clone(),
                from: None,
            },
            _ => GuardDecision::Redirect {
                to: self.config.login_path.clone(),
                from: Some(location.to_string()),
            },
        };
        GuardResolution { state, decision }
    }
}
