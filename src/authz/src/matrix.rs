//! Permission matrix
//!
//! The static role → action-set table. It is the only place an action is ever
//! granted. The standard table is a `const` value; `SUPER_ADMIN`'s entry is
//! computed from [`Action::ALL`] so new actions reach it without an edit here.

use crate::action::Action;
use crate::error::{AuthzError, Result};
use crate::role::Role;
use std::fmt;

/// Set of actions, stored as a bitmask keyed by action ordinal
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActionSet(u64);

impl ActionSet {
    /// The empty set
    pub const EMPTY: ActionSet = ActionSet(0);

    /// Build a set from a slice of actions
    pub const fn of(actions: &[Action]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < actions.len() {
            bits |= 1u64 << actions[i].index();
            i += 1;
        }
        ActionSet(bits)
    }

    /// Every action in the registry
    pub const fn all() -> Self {
        Self::of(&Action::ALL)
    }

    pub const fn contains(self, action: Action) -> bool {
        self.0 & (1u64 << action.index()) != 0
    }

    pub const fn union(self, other: ActionSet) -> Self {
        ActionSet(self.0 | other.0)
    }

    pub const fn difference(self, other: ActionSet) -> Self {
        ActionSet(self.0 & !other.0)
    }

    pub const fn is_subset(self, other: ActionSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the members in ordinal order
    pub fn iter(self) -> impl Iterator<Item = Action> {
        Action::ALL.into_iter().filter(move |a| self.contains(*a))
    }
}

impl fmt::Debug for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Action::as_str)).finish()
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ActionSet::EMPTY, |set, a| set.union(ActionSet::of(&[a])))
    }
}

// Finance holds every staff capability except user creation, payment method
// changes and role assignment.
const FINANCE_ADMIN_GRANTS: ActionSet = ActionSet::all().difference(ActionSet::of(&[
    Action::CreateUser,
    Action::ModifyPaymentMethods,
    Action::AssignStaffRole,
]));

const OPS_ADMIN_GRANTS: ActionSet = FINANCE_ADMIN_GRANTS.difference(ActionSet::of(&[
    Action::IssueFullRefund,
    Action::IssuePartialRefund,
    Action::ExportFinancialReports,
]));

const DEVELOPER_GRANTS: ActionSet =
    FINANCE_ADMIN_GRANTS.difference(ActionSet::of(&[Action::ExportFinancialReports]));

// No financial or unlock capabilities.
const SUPPORT_GRANTS: ActionSet = ActionSet::of(&[
    Action::ViewUserProfile,
    Action::ViewChildProfile,
    Action::ResetPassword,
    Action::ViewTransactionHistory,
    Action::ViewCreditBalance,
    Action::ViewCreditTransactionHistory,
    Action::ViewUnlockedAdventures,
    Action::ViewTotalSlots,
    Action::ViewSavedVersions,
    Action::ViewVersionMetadata,
    Action::ViewNarrationStatus,
]);

/// Standard grants for a role. Exhaustive, so a new role will not compile
/// until it has an entry.
const fn standard_grants(role: Role) -> ActionSet {
    match role {
        Role::SuperAdmin => ActionSet::all(),
        Role::FinanceAdmin => FINANCE_ADMIN_GRANTS,
        Role::OpsAdmin => OPS_ADMIN_GRANTS,
        Role::Support => SUPPORT_GRANTS,
        Role::Developer => DEVELOPER_GRANTS,
        // End users are authorized by application-level scopes instead
        Role::User => ActionSet::EMPTY,
    }
}

/// Immutable role → action-set table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMatrix {
    entries: [Option<ActionSet>; Role::COUNT],
}

impl PermissionMatrix {
    /// The production matrix
    pub const fn standard() -> Self {
        Self {
            entries: [
                Some(standard_grants(Role::SuperAdmin)),
                Some(standard_grants(Role::FinanceAdmin)),
                Some(standard_grants(Role::OpsAdmin)),
                Some(standard_grants(Role::Support)),
                Some(standard_grants(Role::Developer)),
                Some(standard_grants(Role::User)),
            ],
        }
    }

    /// Build a matrix from explicit entries. Roles without an entry have no
    /// permissions; repeated roles accumulate.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Role, ActionSet)>,
    {
        let mut table = [None; Role::COUNT];
        for (role, actions) in entries {
            let slot: &mut Option<ActionSet> = &mut table[role.index()];
            *slot = Some(slot.unwrap_or_default().union(actions));
        }
        Self { entries: table }
    }

    /// Actions granted to `role`; empty when the role has no entry
    pub fn actions_for(&self, role: Role) -> ActionSet {
        self.entries[role.index()].unwrap_or(ActionSet::EMPTY)
    }

    /// Whether `role` has an explicit entry (possibly empty)
    pub fn has_entry(&self, role: Role) -> bool {
        self.entries[role.index()].is_some()
    }

    /// Construction-time self check.
    ///
    /// Every role must have an entry and `SUPER_ADMIN` must hold every action.
    /// A failure here is a startup configuration error.
    pub fn validate(&self) -> Result<()> {
        if let Some(missing) = Role::ALL.into_iter().find(|r| !self.has_entry(*r)) {
            return Err(AuthzError::InvalidMatrix(format!(
                "role {} has no entry",
                missing
            )));
        }

        let super_admin = self.actions_for(Role::SuperAdmin);
        if super_admin != ActionSet::all() {
            let missing: Vec<&str> = ActionSet::all()
                .difference(super_admin)
                .iter()
                .map(Action::as_str)
                .collect();
            return Err(AuthzError::InvalidMatrix(format!(
                "SUPER_ADMIN is missing actions: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }
}

impl Default for PermissionMatrix {
    fn default() -> Self {
        Self::standard()
    }
}
