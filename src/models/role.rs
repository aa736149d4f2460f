use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric role identifier as issued by the panel backend.
pub type RoleId = i32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoleRequirementError {
    #[error("a role requirement needs at least one role")]
    Empty,
    #[error("invalid role identifier '{0}'")]
    InvalidRole(String),
}

/// The set of roles allowed to enter a protected view.
///
/// Never empty. A session satisfies the requirement when it holds *any* of
/// the listed roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RoleId>", into = "Vec<RoleId>")]
pub struct RoleRequirement(BTreeSet<RoleId>);

impl RoleRequirement {
    pub fn new(roles: impl IntoIterator<Item = RoleId>) -> Result<Self, RoleRequirementError> {
        let roles: BTreeSet<RoleId> = roles.into_iter().collect();
        if roles.is_empty() {
            return Err(RoleRequirementError::Empty);
        }
        Ok(RoleRequirement(roles))
    }

    pub fn roles(&self) -> &BTreeSet<RoleId> {
        &self.0
    }

    /// Any-match check: true when the two sets intersect.
    pub fn is_satisfied_by(&self, granted: &BTreeSet<RoleId>) -> bool {
        !self.0.is_disjoint(granted)
    }
}

impl TryFrom<Vec<RoleId>> for RoleRequirement {
    type Error = RoleRequirementError;

    fn try_from(roles: Vec<RoleId>) -> Result<Self, Self::Error> {
        RoleRequirement::new(roles)
    }
}

impl From<RoleRequirement> for Vec<RoleId> {
    fn from(requirement: RoleRequirement) -> Self {
        requirement.0.into_iter().collect()
    }
}

/// Parses a comma separated list such as `"1,3"`.
impl FromStr for RoleRequirement {
    type Err = RoleRequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let roles = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<RoleId>()
                    .map_err(|_| RoleRequirementError::InvalidRole(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        RoleRequirement::new(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted(roles: &[RoleId]) -> BTreeSet<RoleId> {
        roles.iter().copied().collect()
    }

    #[test]
    fn overlapping_roles_satisfy_requirement() {
        let requirement = RoleRequirement::new([1, 3]).unwrap();
        assert!(requirement.is_satisfied_by(&granted(&[2, 3])));
    }

    #[test]
    fn disjoint_or_empty_roles_do_not_satisfy() {
        let requirement = RoleRequirement::new([1, 3]).unwrap();
        assert!(!requirement.is_satisfied_by(&granted(&[2, 4])));
        assert!(!requirement.is_satisfied_by(&granted(&[])));
    }

    #[test]
    fn empty_requirement_is_rejected() {
        assert_eq!(
            RoleRequirement::new(Vec::new()),
            Err(RoleRequirementError::Empty)
        );
        assert_eq!(
            " , ".parse::<RoleRequirement>(),
            Err(RoleRequirementError::Empty)
        );
    }

    #[test]
    fn parses_comma_separated_list() {
        let requirement: RoleRequirement = "3, 1,3".parse().unwrap();
        assert_eq!(requirement.roles(), &granted(&[1, 3]));

        assert_eq!(
            "1,admin".parse::<RoleRequirement>(),
            Err(RoleRequirementError::InvalidRole("admin".to_string()))
        );
    }

    #[test]
    fn deserializing_empty_list_fails() {
        assert!(serde_json::from_str::<RoleRequirement>("[]").is_err());
        let requirement: RoleRequirement = serde_json::from_str("[2, 5]").unwrap();
        assert!(requirement.is_satisfied_by(&granted(&[5])));
    }
}
