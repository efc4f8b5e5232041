//! Privileged admin operations
//!
//! Every operation follows the same order:
//!
//! 1. enforce the actor's role against the operation's action,
//! 2. validate input,
//! 3. apply the change through the [`AccountDirectory`],
//! 4. append an [`AuditEntry`].
//!
//! A denial stops at step 1, before any directory call or audit append. A
//! failed append fails the whole operation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::action::Action;
use crate::audit::{AuditEntry, AuditLedger};
use crate::config::AuthzConfig;
use crate::engine::Authorizer;
use crate::error::{AuthzError, Result};
use crate::identity::{GroupMapping, Identity};
use crate::role::Role;

/// User store / identity provider operations that privileged actions apply
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn add_credits(&self, user_id: &str, amount: u64) -> Result<()>;

    async fn refund(&self, user_id: &str, transaction_ref: &str, amount: u64) -> Result<()>;

    async fn delete_account(&self, user_id: &str) -> Result<()>;

    /// Add the user to an identity-provider group
    async fn assign_group(&self, user_id: &str, group: &str) -> Result<()>;

    /// Remove the user from a group. Succeeds when the user is not a member.
    async fn remove_group(&self, user_id: &str, group: &str) -> Result<()>;
}

/// Full or partial refund
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundKind {
    Full,
    Partial,
}

impl RefundKind {
    pub fn action(self) -> Action {
        match self {
            RefundKind::Full => Action::IssueFullRefund,
            RefundKind::Partial => Action::IssuePartialRefund,
        }
    }
}

/// Result of a completed privileged operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivilegedOutcome {
    pub success: bool,
    /// Transaction id of the audit record
    pub transaction_id: Uuid,
    pub action: Action,
    pub resource: String,
}

/// Admin service
pub struct AdminService {
    authorizer: Authorizer,
    directory: Arc<dyn AccountDirectory>,
    ledger: Arc<dyn AuditLedger>,
    groups: GroupMapping,
    log_denials: bool,
}

impl AdminService {
    pub fn new(
        authorizer: Authorizer,
        directory: Arc<dyn AccountDirectory>,
        ledger: Arc<dyn AuditLedger>,
    ) -> Self {
        Self {
            authorizer,
            directory,
            ledger,
            groups: GroupMapping::default(),
            log_denials: true,
        }
    }

    /// Service over the production matrix, configured from `config`
    pub fn from_config(
        config: &AuthzConfig,
        directory: Arc<dyn AccountDirectory>,
        ledger: Arc<dyn AuditLedger>,
    ) -> Self {
        Self::new(Authorizer::standard(), directory, ledger)
            .with_group_mapping(config.group_mapping())
            .with_denial_logging(config.audit.log_denials)
    }

    /// Groups that role changes clear from the target. Should match the
    /// mapping identity resolution uses.
    pub fn with_group_mapping(mut self, groups: GroupMapping) -> Self {
        self.groups = groups;
        self
    }

    /// Toggle `warn`-level security events for denied attempts.
    /// Denials are never written to the audit ledger.
    pub fn with_denial_logging(mut self, enabled: bool) -> Self {
        self.log_denials = enabled;
        self
    }

    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }

    /// Manually credit a user's balance
    pub async fn issue_user_credits(
        &self,
        actor: &Identity,
        target_user_id: &str,
        amount: u64,
    ) -> Result<PrivilegedOutcome> {
        let action = Action::AddCreditsManually;
        self.authorize(actor, action)?;

        let target = parse_user_id(target_user_id)?;
        if amount == 0 {
            return Err(AuthzError::InvalidInput(
                "amount must be positive".to_string(),
            ));
        }

        info!(actor = actor.subject_id(), target = %target, amount, "Issuing credits");
        self.directory.add_credits(target_user_id, amount).await?;

        self.record(
            actor,
            action,
            format!("user:{}", target_user_id),
            json!({ "amount": amount, "targetUserId": target_user_id }),
        )
        .await
    }

    /// Refund a user's transaction
    pub async fn issue_refund(
        &self,
        actor: &Identity,
        target_user_id: &str,
        transaction_ref: &str,
        amount: u64,
        kind: RefundKind,
    ) -> Result<PrivilegedOutcome> {
        let action = kind.action();
        self.authorize(actor, action)?;

        parse_user_id(target_user_id)?;
        if transaction_ref.trim().is_empty() {
            return Err(AuthzError::InvalidInput(
                "transaction reference is required".to_string(),
            ));
        }
        if amount == 0 {
            return Err(AuthzError::InvalidInput(
                "refund amount must be positive".to_string(),
            ));
        }

        info!(
            actor = actor.subject_id(),
            target = target_user_id,
            transaction = transaction_ref,
            amount,
            ?kind,
            "Issuing refund"
        );
        self.directory
            .refund(target_user_id, transaction_ref, amount)
            .await?;

        self.record(
            actor,
            action,
            format!("transaction:{}", transaction_ref),
            json!({
                "amount": amount,
                "kind": kind,
                "targetUserId": target_user_id,
            }),
        )
        .await
    }

    /// Delete a user account
    pub async fn delete_user_account(
        &self,
        actor: &Identity,
        target_user_id: &str,
    ) -> Result<PrivilegedOutcome> {
        let action = Action::DeleteUserAccount;
        self.authorize(actor, action)?;

        parse_user_id(target_user_id)?;
        if target_user_id == actor.subject_id() {
            return Err(AuthzError::InvalidInput(
                "cannot delete yourself".to_string(),
            ));
        }

        info!(actor = actor.subject_id(), target = target_user_id, "Deleting user account");
        self.directory.delete_account(target_user_id).await?;

        self.record(
            actor,
            action,
            format!("user:{}", target_user_id),
            json!({ "targetUserId": target_user_id }),
        )
        .await
    }

    /// Change a user's role.
    ///
    /// `requested_role` comes from the request body and must name a role in
    /// the registry; it is never coerced.
    pub async fn change_user_role(
        &self,
        actor: &Identity,
        target_user_id: &str,
        requested_role: &str,
    ) -> Result<PrivilegedOutcome> {
        let action = Action::AssignStaffRole;
        self.authorize(actor, action)?;

        parse_user_id(target_user_id)?;
        let role: Role = requested_role.parse()?;
        let group = GroupMapping::canonical_group(role);
        // Only groups of the new role may remain
        let removed = self.groups.groups_outside(role);

        info!(
            actor = actor.subject_id(),
            target = target_user_id,
            %role,
            group,
            "Changing user role"
        );
        for other in &removed {
            self.directory.remove_group(target_user_id, other).await?;
        }
        self.directory.assign_group(target_user_id, group).await?;

        self.record(
            actor,
            action,
            format!("user:{}", target_user_id),
            json!({
                "role": role,
                "group": group,
                "removedGroups": removed,
                "targetUserId": target_user_id,
            }),
        )
        .await
    }

    fn authorize(&self, actor: &Identity, action: Action) -> Result<()> {
        self.authorizer
            .enforce(actor.role(), action)
            .map_err(|denied| {
                if self.log_denials {
                    warn!(
                        actor = actor.subject_id(),
                        role = %denied.role,
                        action = %denied.action,
                        "Security event: access denied"
                    );
                }
                AuthzError::from(denied)
            })
    }

    async fn record(
        &self,
        actor: &Identity,
        action: Action,
        resource: String,
        details: serde_json::Value,
    ) -> Result<PrivilegedOutcome> {
        let entry = AuditEntry::new(actor.subject_id(), action, resource.clone(), details);
        let transaction_id = entry.transaction_id;

        self.ledger.append_log(entry).await.map_err(|e| {
            error!(
                actor = actor.subject_id(),
                %action,
                %transaction_id,
                error = %e,
                "Failed to persist audit log"
            );
            match e {
                AuthzError::AuditAppendFailed(_) => e,
                other => AuthzError::AuditAppendFailed(other.to_string()),
            }
        })?;

        Ok(PrivilegedOutcome {
            success: true,
            transaction_id,
            action,
            resource,
        })
    }
}

fn parse_user_id(user_id: &str) -> Result<Uuid> {
    Uuid::parse_str(user_id)
        .map_err(|_| AuthzError::InvalidInput(format!("invalid user id: {}", user_id)))
}
