//! # StoryNest Access Control
//!
//! Role-based access control for the StoryNest admin backend.
//!
//! ## Features
//!
//! - **Closed registries** of staff roles and fine-grained admin actions
//! - **Static permission matrix**, built at compile time, with `SUPER_ADMIN`
//!   derived from the full action registry
//! - **Fail-closed decisions**: unknown roles are denied every action
//! - **Enforcement gate** producing a structured `PermissionDenied {role, action}`
//! - **Identity resolution** from verified token groups (highest privilege wins)
//! - **Append-only audit ledger** for completed privileged actions
//!
//! ## Example
//!
//! ```rust
//! use storynest_authz::{Action, Authorizer, IdentityResolver, Role, TokenClaims};
//!
//! let resolver = IdentityResolver::default();
//! let claims = TokenClaims::new("staff-42")
//!     .with_group("Support")
//!     .with_group("FinanceAdmin");
//! let identity = resolver.resolve(&claims).unwrap();
//! assert_eq!(identity.role(), Role::FinanceAdmin);
//!
//! let authz = Authorizer::standard();
//! assert!(authz.can(identity.role(), Action::IssuePartialRefund));
//! assert!(authz.enforce(Role::Support, Action::AddCreditsManually).is_err());
//! ```

pub mod action;
pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod matrix;
pub mod role;
pub mod service;
pub mod telemetry;

// Re-export commonly used types
pub use action::{Action, ActionCategory};
pub use audit::{AuditEntry, AuditLedger, InMemoryAuditLedger};
pub use config::AuthzConfig;
pub use engine::{Authorizer, Decision, PermissionDenied};
pub use error::{AuthzError, ErrorBody, Result};
pub use identity::{GroupMapping, Identity, IdentityResolver, TokenClaims};
pub use matrix::{ActionSet, PermissionMatrix};
pub use role::Role;
pub use service::{AccountDirectory, AdminService, PrivilegedOutcome, RefundKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
