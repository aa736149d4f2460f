//! The authenticated request pipeline: bearer injection, refresh on 401,
//! and the sign-in/sign-out calls that populate the session.

pub mod api_client;
pub mod auth_api;
pub mod error;
pub mod request;

pub use api_client::{ApiClient, ApiResponse, build_http_client};
pub use auth_api::{AuthApi, Credentials};
pub use error::{ClientError, SignInError};
pub use request::RetryableRequest;
