//! Error types for the access control layer

use crate::action::Action;
use crate::engine::PermissionDenied;
use crate::role::Role;
use serde::Serialize;
use thiserror::Error;

/// Access control errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The caller's role does not hold the requested action
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),

    /// Role name outside the registry
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// Action tag outside the registry
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Permission matrix failed its construction-time check
    #[error("Invalid permission matrix: {0}")]
    InvalidMatrix(String),

    /// Verified token carried no subject
    #[error("Identity is missing a subject")]
    MissingSubject,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audit record could not be persisted
    #[error("Audit log persistence failed: {0}")]
    AuditAppendFailed(String),

    /// Account directory (identity provider / user store) failure
    #[error("Account directory error: {0}")]
    Directory(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthzError {
    /// HTTP status class the transport layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            AuthzError::PermissionDenied(_) => 403,
            AuthzError::MissingSubject => 401,
            AuthzError::UnknownRole(_)
            | AuthzError::UnknownAction(_)
            | AuthzError::InvalidInput(_) => 400,
            AuthzError::Directory(_) => 503,
            AuthzError::InvalidMatrix(_)
            | AuthzError::AuditAppendFailed(_)
            | AuthzError::Internal(_) => 500,
        }
    }

    /// Client-facing body for this error.
    ///
    /// Denials report only the caller's role and the requested action.
    pub fn to_body(&self) -> ErrorBody {
        let status_code = self.status_code();
        let error = match status_code {
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            503 => "Service Unavailable",
            _ => "Internal Server Error",
        };

        let (role, action) = match self {
            AuthzError::PermissionDenied(denied) => (Some(denied.role), Some(denied.action)),
            _ => (None, None),
        };

        let message = if status_code == 500 {
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        ErrorBody {
            status_code,
            error: error.to_string(),
            message,
            role,
            action,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

/// Result type for access control operations
pub type Result<T> = std::result::Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let denied = AuthzError::from(PermissionDenied {
            role: Role::Support,
            action: Action::IssueFullRefund,
        });
        assert_eq!(denied.status_code(), 403);
        assert_eq!(AuthzError::MissingSubject.status_code(), 401);
        assert_eq!(AuthzError::UnknownRole("ROOT".into()).status_code(), 400);
        assert_eq!(AuthzError::Directory("down".into()).status_code(), 503);
        assert_eq!(AuthzError::AuditAppendFailed("io".into()).status_code(), 500);
    }

    #[test]
    fn test_denial_body_carries_role_and_action() {
        let err = AuthzError::from(PermissionDenied {
            role: Role::Developer,
            action: Action::ExportFinancialReports,
        });

        let body = serde_json::to_value(err.to_body()).unwrap();
        assert_eq!(body["statusCode"], 403);
        assert_eq!(body["error"], "Forbidden");
        assert_eq!(body["role"], "DEVELOPER");
        assert_eq!(body["action"], "export:financial_reports");
    }

    #[test]
    fn test_internal_errors_do_not_leak_detail() {
        let err = AuthzError::AuditAppendFailed("table storynest-prod unreachable".into());
        let body = err.to_body();
        assert_eq!(body.status_code, 500);
        assert!(!body.message.contains("storynest-prod"));
        assert!(body.role.is_none());
    }
}
