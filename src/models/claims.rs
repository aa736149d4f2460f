use std::collections::BTreeSet;

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::role::RoleId;

/// Body returned by the login and refresh endpoints.
///
/// The refresh endpoint usually only sends `access_token`; roles and the user
/// id are then read from the token payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub roles: Option<Vec<RoleId>>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// A freshly issued access token together with whatever identity it carries.
///
/// `roles` and `user_id` are `None` when neither the response body nor the
/// token payload names them; a refresh then keeps the session's current
/// values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedToken {
    pub access_token: String,
    pub roles: Option<BTreeSet<RoleId>>,
    pub user_id: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct AccessTokenClaims {
    sub: Option<String>,
    user_id: Option<String>,
    roles: Option<Vec<RoleId>>,
}

/// Reads the payload of a JWT access token without verifying it.
///
/// The agent is not the audience of the token, the backend verifies it on
/// every call. Opaque (non-JWT) tokens yield `None`.
fn peek_claims(token: &str) -> Option<AccessTokenClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<AccessTokenClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            debug!("Access token payload is not readable: {}", e);
            None
        }
    }
}

impl From<TokenResponse> for RefreshedToken {
    fn from(response: TokenResponse) -> Self {
        let claims = peek_claims(&response.access_token).unwrap_or_default();

        let roles = response
            .roles
            .or(claims.roles)
            .map(|roles| roles.into_iter().collect());
        let user_id = response.user_id.or(claims.user_id).or(claims.sub);

        RefreshedToken {
            access_token: response.access_token,
            roles,
            user_id,
        }
    }
}
