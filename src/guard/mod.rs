//! Role-gated navigation decisions for protected views.

mod route_guard;

pub use route_guard::{GuardDecision, GuardResolution, GuardState, RouteGuard, evaluate};
