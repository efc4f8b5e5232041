//! Role registry
//!
//! The closed set of principals the permission matrix knows about. Five staff
//! roles plus `User`, the end-customer, which holds no staff actions.

use crate::error::AuthzError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role assigned to an authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access to every action
    SuperAdmin,
    /// Finance staff: refunds, reports, credits
    FinanceAdmin,
    /// Operations staff: account and content management, no refunds
    OpsAdmin,
    /// Customer support: read-only views plus password resets
    Support,
    /// Engineering staff
    Developer,
    /// End-customer (parent account)
    User,
}

impl Role {
    /// Number of roles in the registry
    pub const COUNT: usize = 6;

    /// Every role, in ordinal order
    pub const ALL: [Role; Role::COUNT] = [
        Role::SuperAdmin,
        Role::FinanceAdmin,
        Role::OpsAdmin,
        Role::Support,
        Role::Developer,
        Role::User,
    ];

    /// Position of this role in [`Role::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable wire name
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::FinanceAdmin => "FINANCE_ADMIN",
            Role::OpsAdmin => "OPS_ADMIN",
            Role::Support => "SUPPORT",
            Role::Developer => "DEVELOPER",
            Role::User => "USER",
        }
    }

    /// Precedence used when a principal maps to several roles at once.
    ///
    /// Higher wins. The ordering is fixed and does not follow the size of
    /// each role's grant set.
    pub const fn precedence(self) -> u8 {
        match self {
            Role::SuperAdmin => 5,
            Role::FinanceAdmin => 4,
            Role::OpsAdmin => 3,
            Role::Support => 2,
            Role::Developer => 1,
            Role::User => 0,
        }
    }

    /// Whether this is a staff role (anything but `User`)
    pub const fn is_staff(self) -> bool {
        !matches!(self, Role::User)
    }

    /// Parse a role name, falling back to `User` for anything unrecognised
    pub fn parse_or_user(value: &str) -> Role {
        value.parse().unwrap_or(Role::User)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| AuthzError::UnknownRole(value.to_string()))
    }
}
