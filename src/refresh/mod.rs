//! Obtaining a new access token from the ambient refresh credential.

pub mod coalesce;
pub mod error;
pub mod refresher;

pub use coalesce::CoalescingRefresher;
pub use error::AuthRefreshError;
pub use refresher::{HttpTokenRefresher, TokenRefresher, create_refresher};
