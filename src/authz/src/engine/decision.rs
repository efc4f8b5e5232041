//! Authorization decision types

use crate::action::Action;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Denial raised by [`Authorizer::enforce`](super::Authorizer::enforce)
///
/// Carries exactly the role and action that were checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Access Denied: Role {role} cannot perform {action}")]
pub struct PermissionDenied {
    pub role: Role,
    pub action: Action,
}

/// Outcome of a single role/action check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub role: Role,
    pub action: Action,
    pub allowed: bool,
}

impl Decision {
    /// Allow decision
    pub fn allow(role: Role, action: Action) -> Self {
        Self {
            role,
            action,
            allowed: true,
        }
    }

    /// Deny decision
    pub fn deny(role: Role, action: Action) -> Self {
        Self {
            role,
            action,
            allowed: false,
        }
    }

    /// Turn the decision into a gate
    pub fn into_result(self) -> Result<(), PermissionDenied> {
        if self.allowed {
            Ok(())
        } else {
            Err(PermissionDenied {
                role: self.role,
                action: self.action,
            })
        }
    }
}
