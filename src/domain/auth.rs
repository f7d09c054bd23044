//! Caller identity passed into moderation-gated service functions.
//!
//! User management itself lives outside this crate; services only need to
//! know who is acting and which roles they hold.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::domain::types::TypeConstraintError;

/// Role held by an authenticated marketplace user.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Farmer,
    Customer,
    Moderator,
    Administrator,
}

impl UserRole {
    /// String representation used in tokens and persistence.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Customer => "customer",
            Self::Moderator => "moderator",
            Self::Administrator => "administrator",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for UserRole {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "farmer" => Ok(Self::Farmer),
            "customer" => Ok(Self::Customer),
            "moderator" => Ok(Self::Moderator),
            "administrator" => Ok(Self::Administrator),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "user role: {other}"
            ))),
        }
    }
}

/// Identity and roles of the caller, as established by the outer
/// authentication layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Opaque subject identifier issued by the user service.
    pub sub: String,
    pub name: String,
    pub roles: Vec<UserRole>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }

    /// Category moderation requires the moderator or administrator role.
    pub fn can_moderate(&self) -> bool {
        self.has_role(UserRole::Moderator) || self.has_role(UserRole::Administrator)
    }
}
