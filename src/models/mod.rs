pub mod claims;
pub mod role;
pub mod session;

pub use claims::{RefreshedToken, TokenResponse};
pub use role::{RoleId, RoleRequirement, RoleRequirementError};
pub use session::{Session, SessionProjection};
