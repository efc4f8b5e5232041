//! Decision engine
//!
//! Answers "can role R perform action A?" against a validated
//! [`PermissionMatrix`] and turns negative answers into [`PermissionDenied`].
//! Pure and synchronous: no I/O, no locks, no logging. The matrix is shared
//! by `Arc`, so an `Authorizer` is cheap to clone into every request handler.

pub mod decision;

pub use decision::{Decision, PermissionDenied};

use crate::action::Action;
use crate::error::Result;
use crate::matrix::{ActionSet, PermissionMatrix};
use crate::role::Role;

use std::sync::Arc;

/// Role-based authorizer
#[derive(Debug, Clone)]
pub struct Authorizer {
    matrix: Arc<PermissionMatrix>,
}

impl Authorizer {
    /// Create an authorizer over `matrix`, rejecting an incomplete table
    pub fn new(matrix: PermissionMatrix) -> Result<Self> {
        Self::from_shared(Arc::new(matrix))
    }

    /// Create an authorizer over an already shared matrix
    pub fn from_shared(matrix: Arc<PermissionMatrix>) -> Result<Self> {
        matrix.validate()?;
        Ok(Self { matrix })
    }

    /// Authorizer over the production matrix
    pub fn standard() -> Self {
        Self {
            matrix: Arc::new(PermissionMatrix::standard()),
        }
    }

    pub fn matrix(&self) -> &PermissionMatrix {
        &self.matrix
    }

    /// Actions `role` may perform
    pub fn actions_for(&self, role: Role) -> ActionSet {
        self.matrix.actions_for(role)
    }

    /// Whether `role` may perform `action`
    pub fn can(&self, role: Role, action: Action) -> bool {
        self.matrix.actions_for(role).contains(action)
    }

    /// Same as [`can`](Self::can) for a role given by name.
    ///
    /// Names outside the role registry are denied every action.
    pub fn can_as(&self, role: &str, action: Action) -> bool {
        match role.parse::<Role>() {
            Ok(role) => self.can(role, action),
            Err(_) => false,
        }
    }

    /// Check and keep the outcome
    pub fn decide(&self, role: Role, action: Action) -> Decision {
        if self.can(role, action) {
            Decision::allow(role, action)
        } else {
            Decision::deny(role, action)
        }
    }

    /// Gate a privileged operation. Call before any side effect.
    pub fn enforce(&self, role: Role, action: Action) -> std::result::Result<(), PermissionDenied> {
        self.decide(role, action).into_result()
    }
}

impl Default for Authorizer {
    fn default() -> Self {
        Self::standard()
    }
}
