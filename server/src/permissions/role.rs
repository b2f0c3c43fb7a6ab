//! Platform roles.
//!
//! A closed set: every branch on a role matches exhaustively, so adding a
//! variant forces every gate to be revisited.

use std::fmt;
use std::str::FromStr;

/// Authorization level attached to an account.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Implicit role of every account without an assignment.
    #[default]
    User,
    /// Trusted member with elevated visibility.
    Moderator,
    /// Full access to the admin panel.
    Admin,
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role '{0}'. Must be one of: user, moderator, admin")]
pub struct UnknownRole(pub String);

impl Role {
    /// Stored name of the role.
    ///
    /// # Examples
    ///
    /// ```
    /// use studyhub_server::permissions::Role;
    ///
    /// assert_eq!(Role::Moderator.as_str(), "moderator");
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }

    /// Returns all roles, least privileged first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::User, Self::Moderator, Self::Admin]
    }

    /// Whether this role opens the admin panel.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        match self {
            Self::Admin => true,
            Self::User | Self::Moderator => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
