//! Action registry
//!
//! Every administrative capability the permission matrix can grant. Actions are
//! opaque tags: the category grouping exists for reports and documentation and
//! plays no part in decisions.

use crate::error::AuthzError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Administrative capability
///
/// Serialized as its stable wire string (`add:credits_manually`), which is
/// also the value written to audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    // User management
    #[serde(rename = "create:user")]
    CreateUser,
    #[serde(rename = "view:user_profile")]
    ViewUserProfile,
    #[serde(rename = "view:child_profile")]
    ViewChildProfile,
    #[serde(rename = "edit:user_info")]
    EditUserInfo,
    #[serde(rename = "reset:password")]
    ResetPassword,
    #[serde(rename = "change:user_email")]
    ChangeUserEmail,
    #[serde(rename = "change:account_status")]
    ChangeAccountStatus,
    #[serde(rename = "delete:user_account")]
    DeleteUserAccount,
    #[serde(rename = "assign:staff_role")]
    AssignStaffRole,

    // Financial
    #[serde(rename = "view:transaction_history")]
    ViewTransactionHistory,
    #[serde(rename = "issue:full_refund")]
    IssueFullRefund,
    #[serde(rename = "issue:partial_refund")]
    IssuePartialRefund,
    #[serde(rename = "export:financial_reports")]
    ExportFinancialReports,
    #[serde(rename = "modify:payment_methods")]
    ModifyPaymentMethods,

    // Credits
    #[serde(rename = "view:credit_balance")]
    ViewCreditBalance,
    #[serde(rename = "add:credits_manually")]
    AddCreditsManually,
    #[serde(rename = "remove:credits_manually")]
    RemoveCreditsManually,
    #[serde(rename = "comp:promotional_credits")]
    CompPromotionalCredits,
    #[serde(rename = "view:credit_transaction_history")]
    ViewCreditTransactionHistory,

    // Adventure entitlements
    #[serde(rename = "view:unlocked_adventures")]
    ViewUnlockedAdventures,
    #[serde(rename = "unlock:adventures_manually")]
    UnlockAdventuresManually,
    #[serde(rename = "revoke:unlocks_manually")]
    RevokeUnlocksManually,
    #[serde(rename = "unlock:adventures_bulk")]
    UnlockAdventuresBulk,

    // Save slots
    #[serde(rename = "view:total_slots")]
    ViewTotalSlots,
    #[serde(rename = "add:slots_manually")]
    AddSlotsManually,
    #[serde(rename = "remove:slots_manually")]
    RemoveSlotsManually,
    #[serde(rename = "delete:version_occupying_slot")]
    DeleteVersionOccupyingSlot,

    // Version management
    #[serde(rename = "view:saved_versions")]
    ViewSavedVersions,
    #[serde(rename = "view:version_metadata")]
    ViewVersionMetadata,
    #[serde(rename = "delete:saved_version")]
    DeleteSavedVersion,
    #[serde(rename = "restore:version")]
    RestoreVersion,
    #[serde(rename = "delete:orphaned_assets")]
    DeleteOrphanedAssets,

    // Narration
    #[serde(rename = "view:narration_status")]
    ViewNarrationStatus,
    #[serde(rename = "grant:narration_manually")]
    GrantNarrationManually,
    #[serde(rename = "remove:narration")]
    RemoveNarration,

    // Risk
    #[serde(rename = "mark:account_risky")]
    MarkAccountRisky,
    #[serde(rename = "suspend:account")]
    SuspendAccount,
    #[serde(rename = "lift:suspension")]
    LiftSuspension,
}

/// Documentation grouping for actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    UserManagement,
    Financial,
    Credits,
    Entitlements,
    SaveSlots,
    Versions,
    Narration,
    Risk,
}

impl Action {
    /// Number of actions in the registry
    pub const COUNT: usize = 38;

    /// Every action, in ordinal order
    pub const ALL: [Action; Action::COUNT] = [
        Action::CreateUser,
        Action::ViewUserProfile,
        Action::ViewChildProfile,
        Action::EditUserInfo,
        Action::ResetPassword,
        Action::ChangeUserEmail,
        Action::ChangeAccountStatus,
        Action::DeleteUserAccount,
        Action::AssignStaffRole,
        Action::ViewTransactionHistory,
        Action::IssueFullRefund,
        Action::IssuePartialRefund,
        Action::ExportFinancialReports,
        Action::ModifyPaymentMethods,
        Action::ViewCreditBalance,
        Action::AddCreditsManually,
        Action::RemoveCreditsManually,
        Action::CompPromotionalCredits,
        Action::ViewCreditTransactionHistory,
        Action::ViewUnlockedAdventures,
        Action::UnlockAdventuresManually,
        Action::RevokeUnlocksManually,
        Action::UnlockAdventuresBulk,
        Action::ViewTotalSlots,
        Action::AddSlotsManually,
        Action::RemoveSlotsManually,
        Action::DeleteVersionOccupyingSlot,
        Action::ViewSavedVersions,
        Action::ViewVersionMetadata,
        Action::DeleteSavedVersion,
        Action::RestoreVersion,
        Action::DeleteOrphanedAssets,
        Action::ViewNarrationStatus,
        Action::GrantNarrationManually,
        Action::RemoveNarration,
        Action::MarkAccountRisky,
        Action::SuspendAccount,
        Action::LiftSuspension,
    ];

    /// Position of this action in [`Action::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable wire string, used in audit records and across services
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::CreateUser => "create:user",
            Action::ViewUserProfile => "view:user_profile",
            Action::ViewChildProfile => "view:child_profile",
            Action::EditUserInfo => "edit:user_info",
            Action::ResetPassword => "reset:password",
            Action::ChangeUserEmail => "change:user_email",
            Action::ChangeAccountStatus => "change:account_status",
            Action::DeleteUserAccount => "delete:user_account",
            Action::AssignStaffRole => "assign:staff_role",
            Action::ViewTransactionHistory => "view:transaction_history",
            Action::IssueFullRefund => "issue:full_refund",
            Action::IssuePartialRefund => "issue:partial_refund",
            Action::ExportFinancialReports => "export:financial_reports",
            Action::ModifyPaymentMethods => "modify:payment_methods",
            Action::ViewCreditBalance => "view:credit_balance",
            Action::AddCreditsManually => "add:credits_manually",
            Action::RemoveCreditsManually => "remove:credits_manually",
            Action::CompPromotionalCredits => "comp:promotional_credits",
            Action::ViewCreditTransactionHistory => "view:credit_transaction_history",
            Action::ViewUnlockedAdventures => "view:unlocked_adventures",
            Action::UnlockAdventuresManually => "unlock:adventures_manually",
            Action::RevokeUnlocksManually => "revoke:unlocks_manually",
            Action::UnlockAdventuresBulk => "unlock:adventures_bulk",
            Action::ViewTotalSlots => "view:total_slots",
            Action::AddSlotsManually => "add:slots_manually",
            Action::RemoveSlotsManually => "remove:slots_manually",
            Action::DeleteVersionOccupyingSlot => "delete:version_occupying_slot",
            Action::ViewSavedVersions => "view:saved_versions",
            Action::ViewVersionMetadata => "view:version_metadata",
            Action::DeleteSavedVersion => "delete:saved_version",
            Action::RestoreVersion => "restore:version",
            Action::DeleteOrphanedAssets => "delete:orphaned_assets",
            Action::ViewNarrationStatus => "view:narration_status",
            Action::GrantNarrationManually => "grant:narration_manually",
            Action::RemoveNarration => "remove:narration",
            Action::MarkAccountRisky => "mark:account_risky",
            Action::SuspendAccount => "suspend:account",
            Action::LiftSuspension => "lift:suspension",
        }
    }

    pub const fn category(self) -> ActionCategory {
        use ActionCategory::*;
        match self {
            Action::CreateUser
            | Action::ViewUserProfile
            | Action::ViewChildProfile
            | Action::EditUserInfo
            | Action::ResetPassword
            | Action::ChangeUserEmail
            | Action::ChangeAccountStatus
            | Action::DeleteUserAccount
            | Action::AssignStaffRole => UserManagement,
            Action::ViewTransactionHistory
            | Action::IssueFullRefund
            | Action::IssuePartialRefund
            | Action::ExportFinancialReports
            | Action::ModifyPaymentMethods => Financial,
            Action::ViewCreditBalance
            | Action::AddCreditsManually
            | Action::RemoveCreditsManually
            | Action::CompPromotionalCredits
            | Action::ViewCreditTransactionHistory => Credits,
            Action::ViewUnlockedAdventures
            | Action::UnlockAdventuresManually
            | Action::RevokeUnlocksManually
            | Action::UnlockAdventuresBulk => Entitlements,
            Action::ViewTotalSlots
            | Action::AddSlotsManually
            | Action::RemoveSlotsManually
            | Action::DeleteVersionOccupyingSlot => SaveSlots,
            Action::ViewSavedVersions
            | Action::ViewVersionMetadata
            | Action::DeleteSavedVersion
            | Action::RestoreVersion
            | Action::DeleteOrphanedAssets => Versions,
            Action::ViewNarrationStatus
            | Action::GrantNarrationManually
            | Action::RemoveNarration => Narration,
            Action::MarkAccountRisky | Action::SuspendAccount | Action::LiftSuspension => Risk,
        }
    }
}

// `ALL` must end on the last declared variant, and the bitmask in
// `matrix::ActionSet` holds at most 64 tags.
const _: () = assert!(Action::LiftSuspension as usize + 1 == Action::COUNT);
const _: () = assert!(Action::COUNT <= 64);

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AuthzError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AuthzError::UnknownAction(value.to_string()))
    }
}
