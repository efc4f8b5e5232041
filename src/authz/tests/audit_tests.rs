//! Audit ledger tests
//!
//! Record layout, per-actor queries, concurrent appends and the rule that a
//! privileged action never completes without its audit record.

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storynest_authz::{
    AccountDirectory, Action, AdminService, AuditEntry, AuditLedger, AuthzError, Authorizer,
    Identity, InMemoryAuditLedger, RefundKind, Result, Role,
};

const TARGET_USER: &str = "0b5f3a10-2c7e-4d91-8e44-91a6c3f2d870";

struct AcceptingDirectory;

#[async_trait]
impl AccountDirectory for AcceptingDirectory {
    async fn add_credits(&self, _user_id: &str, _amount: u64) -> Result<()> {
        Ok(())
    }

    async fn refund(&self, _user_id: &str, _transaction_ref: &str, _amount: u64) -> Result<()> {
        Ok(())
    }

    async fn delete_account(&self, _user_id: &str) -> Result<()> {
        Ok(())
    }

    async fn assign_group(&self, _user_id: &str, _group: &str) -> Result<()> {
        Ok(())
    }

    async fn remove_group(&self, _user_id: &str, _group: &str) -> Result<()> {
        Ok(())
    }
}

/// Accepts the first `capacity` appends, then rejects everything
struct QuotaLedger {
    inner: InMemoryAuditLedger,
    capacity: usize,
    attempts: AtomicUsize,
}

impl QuotaLedger {
    fn new(capacity: usize) -> Self {
        Self {
            inner: InMemoryAuditLedger::new(),
            capacity,
            attempts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AuditLedger for QuotaLedger {
    async fn append_log(&self, entry: AuditEntry) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.capacity {
            return Err(AuthzError::AuditAppendFailed("write capacity exceeded".into()));
        }
        self.inner.append_log(entry).await
    }
}

fn create_service(ledger: Arc<dyn AuditLedger>) -> AdminService {
    AdminService::new(Authorizer::standard(), Arc::new(AcceptingDirectory), ledger)
}

// ============================================================================
// RECORD LAYOUT
// ============================================================================

#[tokio::test]
async fn test_entry_carries_action_wire_string() {
    let ledger = InMemoryAuditLedger::new();
    let service = create_service(Arc::new(ledger.clone()));
    let actor = Identity::new("dev-9", Role::Developer);

    service
        .issue_refund(&actor, TARGET_USER, "txn-77", 1200, RefundKind::Full)
        .await
        .unwrap();

    let entries = ledger.entries().await;
    assert_eq!(entries.len(), 1);

    let entry = &entries[0];
    assert_eq!(entry.partition_key(), "AUDIT#dev-9");
    assert!(entry.sort_key().starts_with("TS#"));
    assert!(entry
        .sort_key()
        .ends_with(&format!("Z#{}", entry.transaction_id)));

    let value = serde_json::to_value(entry).unwrap();
    assert_eq!(value["action"], "issue:full_refund");
    assert_eq!(value["resource"], "transaction:txn-77");
    assert_eq!(value["details"]["kind"], "full");
    assert_eq!(value["details"]["targetUserId"], TARGET_USER);
}

#[test]
fn test_entry_deserializes_stored_record() {
    let stored = json!({
        "transactionId": "5a4b2f0e-7d3c-4f8e-9a61-0c2d4e6f8a10",
        "actorId": "fin-1",
        "action": "export:financial_reports",
        "resource": "report:2026-Q1",
        "timestamp": "2026-04-02T08:30:00.000Z"
    });

    let entry: AuditEntry = serde_json::from_value(stored).unwrap();
    assert_eq!(entry.action, Action::ExportFinancialReports);
    assert!(entry.details.is_null());
    assert_eq!(
        entry.sort_key(),
        "TS#2026-04-02T08:30:00.000Z#5a4b2f0e-7d3c-4f8e-9a61-0c2d4e6f8a10"
    );
}

#[test]
fn test_entry_rejects_unknown_action() {
    let stored = json!({
        "transactionId": "5a4b2f0e-7d3c-4f8e-9a61-0c2d4e6f8a10",
        "actorId": "fin-1",
        "action": "drop:tables",
        "resource": "db",
        "timestamp": "2026-04-02T08:30:00.000Z"
    });

    assert!(serde_json::from_value::<AuditEntry>(stored).is_err());
}

// ============================================================================
// APPEND FAILURES
// ============================================================================

#[tokio::test]
async fn test_failed_append_fails_operation() {
    let ledger = Arc::new(QuotaLedger::new(1));
    let service = create_service(ledger.clone());
    let actor = Identity::new("root-1", Role::SuperAdmin);

    let first = service.issue_user_credits(&actor, TARGET_USER, 10).await;
    assert!(first.is_ok());

    let second = service.issue_user_credits(&actor, TARGET_USER, 10).await;
    let err = second.unwrap_err();
    assert!(matches!(err, AuthzError::AuditAppendFailed(_)));

    // Internal details stay out of the client body
    let body = err.to_body();
    assert_eq!(body.status_code, 500);
    assert!(!body.message.contains("capacity"));

    assert_eq!(ledger.inner.len().await, 1);
}

#[tokio::test]
async fn test_denied_operation_never_reaches_ledger() {
    let ledger = Arc::new(QuotaLedger::new(10));
    let service = create_service(ledger.clone());
    let actor = Identity::new("sup-1", Role::Support);

    for kind in [RefundKind::Full, RefundKind::Partial] {
        let err = service
            .issue_refund(&actor, TARGET_USER, "txn-1", 50, kind)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    assert_eq!(ledger.attempts.load(Ordering::SeqCst), 0);
}

// ============================================================================
// QUERIES AND CONCURRENCY
// ============================================================================

#[tokio::test]
async fn test_actor_history_newest_first() {
    let ledger = InMemoryAuditLedger::new();

    let actions = [
        Action::SuspendAccount,
        Action::LiftSuspension,
        Action::ResetPassword,
    ];
    for action in actions {
        ledger
            .append_log(AuditEntry::new("ops-4", action, "user:x", json!({})))
            .await
            .unwrap();
    }
    ledger
        .append_log(AuditEntry::new("ops-5", Action::ViewUserProfile, "user:y", json!({})))
        .await
        .unwrap();

    let history = ledger.entries_for_actor("ops-4", 10).await;
    let seen: Vec<Action> = history.iter().map(|e| e.action).collect();
    assert_eq!(
        seen,
        vec![
            Action::ResetPassword,
            Action::LiftSuspension,
            Action::SuspendAccount
        ]
    );

    assert!(ledger.entries_for_actor("nobody", 10).await.is_empty());
}

#[tokio::test]
async fn test_concurrent_appends() {
    let ledger = InMemoryAuditLedger::new();
    let mut handles = vec![];

    for i in 0..100 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            let entry = AuditEntry::new(
                format!("staff-{}", i % 5),
                Action::AddCreditsManually,
                format!("user:{}", i),
                json!({ "amount": i }),
            );
            ledger.append_log(entry).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(ledger.len().await, 100);
    assert_eq!(ledger.entries_for_actor("staff-0", 100).await.len(), 20);

    let mut ids: Vec<_> = ledger
        .entries()
        .await
        .into_iter()
        .map(|e| e.transaction_id)
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 100);
}
