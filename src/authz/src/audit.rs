//! Audit ledger for privileged actions
//!
//! Append-only record of privileged actions that completed. Entries are keyed
//! by actor so "what did X do?" is a single partition scan.
//!
//! # Record layout
//!
//! ```text
//! PK: AUDIT#<actorId>
//! SK: TS#<RFC 3339 timestamp>#<transactionId>
//! { transactionId, actorId, action, resource, timestamp, details }
//! ```
//!
//! Ledgers expose no update or delete. A failed append must fail the enclosing
//! operation: no privileged action completes without its audit record.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::action::Action;
use crate::error::Result;

/// Audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Unique transaction ID
    pub transaction_id: Uuid,

    /// Subject id of the staff member who acted
    pub actor_id: String,

    /// Action performed (serialized as its wire string)
    pub action: Action,

    /// Target resource, e.g. `user:<id>`
    pub resource: String,

    pub timestamp: DateTime<Utc>,

    /// Operation-specific details (JSON)
    #[serde(default)]
    pub details: serde_json::Value,
}

impl AuditEntry {
    /// New entry stamped with a fresh transaction id and the current time
    pub fn new(
        actor_id: impl Into<String>,
        action: Action,
        resource: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            actor_id: actor_id.into(),
            action,
            resource: resource.into(),
            timestamp: Utc::now(),
            details,
        }
    }

    pub fn partition_key(&self) -> String {
        format!("AUDIT#{}", self.actor_id)
    }

    /// Time-ordered key, unique per entry even within one millisecond
    pub fn sort_key(&self) -> String {
        format!(
            "TS#{}#{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.transaction_id
        )
    }
}

/// Append-only audit ledger
#[async_trait]
pub trait AuditLedger: Send + Sync {
    /// Persist an entry. An error means the entry was not recorded.
    async fn append_log(&self, entry: AuditEntry) -> Result<()>;
}

/// In-memory ledger
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLedger {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
}

impl InMemoryAuditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in append order
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().await.clone()
    }

    /// Most recent entries for an actor, newest first
    pub async fn entries_for_actor(&self, actor_id: &str, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;

        entries
            .iter()
            .rev()
            .filter(|e| e.actor_id == actor_id)
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AuditLedger for InMemoryAuditLedger {
    async fn append_log(&self, entry: AuditEntry) -> Result<()> {
        debug!(
            actor = %entry.actor_id,
            action = %entry.action,
            transaction = %entry.transaction_id,
            "Audit entry appended"
        );
        self.entries.write().await.push(entry);
        Ok(())
    }
}
