//! Identity resolution
//!
//! Maps the claims of an already verified access token onto an [`Identity`].
//! Token signature checks happen upstream; this module only decides which
//! [`Role`] a set of identity-provider groups stands for.
//!
//! Resolution is total: every claim set yields exactly one role. When several
//! groups match, the role with the highest [`Role::precedence`] wins, so the
//! result never depends on the order the provider lists groups in. Unknown or
//! absent groups resolve to [`Role::User`].

use crate::error::{AuthzError, Result};
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Claims of a verified access token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Stable subject identifier
    pub sub: String,

    /// Identity-provider group memberships
    #[serde(rename = "cognito:groups", default)]
    pub groups: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl TokenClaims {
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            ..Self::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Per-request resolved principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    subject_id: String,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

impl Identity {
    pub fn new(subject_id: impl Into<String>, role: Role) -> Self {
        Self {
            subject_id: subject_id.into(),
            role,
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Display attribute only; never consulted for decisions
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Many-to-one mapping from identity-provider group names to roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMapping {
    groups: HashMap<String, Role>,
}

impl GroupMapping {
    /// Empty mapping: every principal resolves to `User`
    pub fn empty() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }

    /// Canonical group per staff role
    pub fn standard() -> Self {
        let mut mapping = Self::empty();
        for role in Role::ALL.into_iter().filter(|r| r.is_staff()) {
            mapping = mapping.with_alias(Self::canonical_group(role), role);
        }
        mapping
    }

    /// Standard mapping plus the legacy `Admin` group
    pub fn standard_with_legacy() -> Self {
        Self::standard().with_alias("Admin", Role::SuperAdmin)
    }

    /// Map another group name onto `role`
    pub fn with_alias(mut self, group: impl Into<String>, role: Role) -> Self {
        self.groups.insert(group.into(), role);
        self
    }

    /// Group a role is written back to when it is assigned
    pub const fn canonical_group(role: Role) -> &'static str {
        match role {
            Role::SuperAdmin => "SuperAdmin",
            Role::FinanceAdmin => "FinanceAdmin",
            Role::OpsAdmin => "OpsAdmin",
            Role::Support => "Support",
            Role::Developer => "Developer",
            Role::User => "Users",
        }
    }

    /// Role mapped to a single group name (exact, case-sensitive)
    pub fn role_for_group(&self, group: &str) -> Option<Role> {
        self.groups.get(group).copied()
    }

    /// Resolve a set of group names to one role, highest precedence first
    pub fn resolve_role<I, S>(&self, groups: I) -> Role
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        groups
            .into_iter()
            .filter_map(|g| self.role_for_group(g.as_ref()))
            .max_by_key(|role| role.precedence())
            .unwrap_or(Role::User)
    }

    /// Mapped group names that resolve to any role other than `role`, sorted
    pub fn groups_outside(&self, role: Role) -> Vec<&str> {
        let mut groups: Vec<&str> = self
            .groups
            .iter()
            .filter(|(_, mapped)| **mapped != role)
            .map(|(group, _)| group.as_str())
            .collect();
        groups.sort_unstable();
        groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Default for GroupMapping {
    fn default() -> Self {
        Self::standard_with_legacy()
    }
}

/// Builds an [`Identity`] from verified token claims
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    mapping: GroupMapping,
}

impl IdentityResolver {
    pub fn new(mapping: GroupMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &GroupMapping {
        &self.mapping
    }

    /// Resolve the caller's identity.
    ///
    /// Fails only when the claims carry no subject.
    pub fn resolve(&self, claims: &TokenClaims) -> Result<Identity> {
        if claims.sub.trim().is_empty() {
            return Err(AuthzError::MissingSubject);
        }

        let role = self.mapping.resolve_role(&claims.groups);
        debug!(
            subject = %claims.sub,
            groups = ?claims.groups,
            %role,
            "Resolved identity"
        );

        let mut identity = Identity::new(claims.sub.clone(), role);
        if let Some(email) = claims.email.as_ref().or(claims.username.as_ref()) {
            identity = identity.with_email(email.clone());
        }
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_group() {
        let mapping = GroupMapping::default();
        assert_eq!(mapping.resolve_role(["FinanceAdmin"]), Role::FinanceAdmin);
        assert_eq!(mapping.resolve_role(["Support"]), Role::Support);
        assert_eq!(mapping.resolve_role(["Developer"]), Role::Developer);
    }

    #[test]
    fn test_no_or_unknown_groups_resolve_to_user() {
        let mapping = GroupMapping::default();
        assert_eq!(mapping.resolve_role(Vec::<String>::new()), Role::User);
        assert_eq!(mapping.resolve_role(["Parents", "beta-testers"]), Role::User);
        // Exact match only
        assert_eq!(mapping.resolve_role(["superadmin"]), Role::User);
    }

    #[test]
    fn test_highest_precedence_wins() {
        let mapping = GroupMapping::default();
        assert_eq!(
            mapping.resolve_role(["Support", "FinanceAdmin"]),
            Role::FinanceAdmin
        );
        assert_eq!(
            mapping.resolve_role(["FinanceAdmin", "Support"]),
            Role::FinanceAdmin
        );
        assert_eq!(mapping.resolve_role(["Developer", "Support"]), Role::Support);
        assert_eq!(mapping.resolve_role(["Developer", "Admin"]), Role::SuperAdmin);
    }

    #[test]
    fn test_legacy_admin_group() {
        assert_eq!(GroupMapping::default().resolve_role(["Admin"]), Role::SuperAdmin);
        assert_eq!(GroupMapping::standard().resolve_role(["Admin"]), Role::User);
    }

    #[test]
    fn test_canonical_groups_round_trip() {
        let mapping = GroupMapping::standard();
        for role in Role::ALL {
            assert_eq!(
                mapping.resolve_role([GroupMapping::canonical_group(role)]),
                role
            );
        }
    }

    #[test]
    fn test_resolve_claims() {
        let resolver = IdentityResolver::default();
        let claims: TokenClaims = serde_json::from_value(serde_json::json!({
            "sub": "0b7c5a8e-1f3d-4f7a-9a51-3c2e6f1d9b42",
            "cognito:groups": ["Support"],
            "username": "maya@storynest.example"
        }))
        .unwrap();

        let identity = resolver.resolve(&claims).unwrap();
        assert_eq!(identity.subject_id(), "0b7c5a8e-1f3d-4f7a-9a51-3c2e6f1d9b42");
        assert_eq!(identity.role(), Role::Support);
        assert_eq!(identity.email(), Some("maya@storynest.example"));
    }

    #[test]
    fn test_claims_without_groups() {
        let claims: TokenClaims =
            serde_json::from_value(serde_json::json!({ "sub": "user-1" })).unwrap();
        let identity = IdentityResolver::default().resolve(&claims).unwrap();
        assert_eq!(identity.role(), Role::User);
        assert_eq!(identity.email(), None);
    }

    #[test]
    fn test_missing_subject() {
        let err = IdentityResolver::default()
            .resolve(&TokenClaims::new("  ").with_group("SuperAdmin"))
            .unwrap_err();
        assert!(matches!(err, AuthzError::MissingSubject));
    }

    #[test]
    fn test_groups_outside_role() {
        let mapping = GroupMapping::default();

        let others = mapping.groups_outside(Role::Support);
        assert_eq!(
            others,
            vec!["Admin", "Developer", "FinanceAdmin", "OpsAdmin", "SuperAdmin"]
        );

        // Legacy alias shares SUPER_ADMIN with the canonical group
        let others = mapping.groups_outside(Role::SuperAdmin);
        assert!(!others.contains(&"Admin"));
        assert!(!others.contains(&"SuperAdmin"));
        assert_eq!(mapping.groups_outside(Role::User).len(), mapping.len());
    }

    #[test]
    fn test_custom_alias() {
        let mapping = GroupMapping::standard().with_alias("Finance", Role::FinanceAdmin);
        let resolver = IdentityResolver::new(mapping);
        let identity = resolver
            .resolve(&TokenClaims::new("u-9").with_group("Finance").with_email("a@b.c"))
            .unwrap();
        assert_eq!(identity.role(), Role::FinanceAdmin);
    }
}
