//! Loan application status vocabulary and actor roles.
//!
//! [`ApplicationStatus`] is the closed set of workflow states. The wire and
//! database encoding is the SCREAMING_SNAKE form (`"MANAGER_APPROVED"`);
//! [`ApplicationStatus::parse`] is the only place a raw string becomes a
//! status, so the rest of the system works on the enum exclusively.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// ---------------------------------------------------------------------------
// ApplicationStatus
// ---------------------------------------------------------------------------

/// Workflow state of a loan application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    /// Submitted, awaiting the manager decision.
    Pending,
    /// Approved by the manager, awaiting the finance decision.
    ManagerApproved,
    /// Rejected by the manager. Terminal.
    ManagerRejected,
    /// Approved by finance, awaiting disbursement.
    FinanceApproved,
    /// Rejected by finance. Terminal.
    FinanceRejected,
    /// Disbursed and under repayment.
    Active,
    /// Fully repaid. Terminal.
    Completed,
}

impl ApplicationStatus {
    /// Every status, in pipeline order.
    pub const ALL: [ApplicationStatus; 7] = [
        Self::Pending,
        Self::ManagerApproved,
        Self::ManagerRejected,
        Self::FinanceApproved,
        Self::FinanceRejected,
        Self::Active,
        Self::Completed,
    ];

    /// The stable string encoding used in the database and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::ManagerApproved => "MANAGER_APPROVED",
            Self::ManagerRejected => "MANAGER_REJECTED",
            Self::FinanceApproved => "FINANCE_APPROVED",
            Self::FinanceRejected => "FINANCE_REJECTED",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
        }
    }

    /// Parse the stable string encoding back into a status.
    pub fn parse(value: &str) -> CoreResult<Self> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "MANAGER_APPROVED" => Ok(Self::ManagerApproved),
            "MANAGER_REJECTED" => Ok(Self::ManagerRejected),
            "FINANCE_APPROVED" => Ok(Self::FinanceApproved),
            "FINANCE_REJECTED" => Ok(Self::FinanceRejected),
            "ACTIVE" => Ok(Self::Active),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }

    /// A terminal status has no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::ManagerRejected | Self::FinanceRejected | Self::Completed
        )
    }

    /// Position on the happy path
    /// PENDING < MANAGER_APPROVED < FINANCE_APPROVED < ACTIVE < COMPLETED,
    /// or `None` for the rejected states.
    pub fn happy_path_rank(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::ManagerApproved => Some(1),
            Self::FinanceApproved => Some(2),
            Self::Active => Some(3),
            Self::Completed => Some(4),
            Self::ManagerRejected | Self::FinanceRejected => None,
        }
    }

    /// Display badge for this status.
    pub fn badge(self) -> StatusBadge {
        match self {
            Self::Pending => StatusBadge::new("Pending", BadgeTone::Warning),
            Self::ManagerApproved => StatusBadge::new("Manager Approved", BadgeTone::Info),
            Self::ManagerRejected => StatusBadge::new("Manager Rejected", BadgeTone::Danger),
            Self::FinanceApproved => StatusBadge::new("Finance Approved", BadgeTone::Accent),
            Self::FinanceRejected => StatusBadge::new("Finance Rejected", BadgeTone::Danger),
            Self::Active => StatusBadge::new("Active", BadgeTone::Success),
            Self::Completed => StatusBadge::new("Completed", BadgeTone::Neutral),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status badge
// ---------------------------------------------------------------------------

/// Visual weight of a status badge, mapped to theme colors by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    Warning,
    Info,
    Danger,
    Accent,
    Success,
    Neutral,
}

/// Display-ready badge for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: BadgeTone,
}

impl StatusBadge {
    fn new(label: &'static str, tone: BadgeTone) -> Self {
        Self { label, tone }
    }
}

// ---------------------------------------------------------------------------
// ActorRole
// ---------------------------------------------------------------------------

/// Role of the party performing a workflow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    /// The employee who submitted the application.
    Applicant,
    /// The applicant's reporting manager.
    Manager,
    /// A finance officer.
    Finance,
    /// Automated transitions (disbursement confirmation, final repayment).
    System,
    /// Administrators manage loan products but take no workflow decisions.
    Admin,
}

impl ActorRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applicant => "APPLICANT",
            Self::Manager => "MANAGER",
            Self::Finance => "FINANCE",
            Self::System => "SYSTEM",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
