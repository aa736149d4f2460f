use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::claims::RefreshedToken;
use super::role::RoleId;

/// The in-memory identity of the panel user.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub roles: BTreeSet<RoleId>,
    pub user_id: String,
}

impl Session {
    /// The signed-out session every process starts with.
    pub fn empty() -> Self {
        Session::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// What the navigation layer is allowed to see; never includes the token.
    pub fn projection(&self) -> SessionProjection {
        SessionProjection {
            authenticated: self.is_authenticated(),
            user_id: self.user_id.clone(),
            roles: self.roles.iter().copied().collect(),
        }
    }

    /// Swaps in a refreshed token, keeping the roles and user id the refresh
    /// did not restate.
    pub fn renew(&mut self, token: RefreshedToken) {
        self.access_token = Some(token.access_token);
        if let Some(roles) = token.roles {
            self.roles = roles;
        }
        if let Some(user_id) = token.user_id {
            self.user_id = user_id;
        }
    }
}

impl From<RefreshedToken> for Session {
    fn from(token: RefreshedToken) -> Self {
        Session {
            access_token: Some(token.access_token),
            roles: token.roles.unwrap_or_default(),
            user_id: token.user_id.unwrap_or_default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionProjection {
    pub authenticated: bool,
    pub user_id: String,
    pub roles: Vec<RoleId>,
}
