//! Timeline presentation: classify canonical steps into display stages.
//!
//! Every application renders as the same five stages; what varies is each
//! stage's [`StepState`], derived from the current status against the
//! pipeline ordering, and the date/comment/actor enrichment pulled from the
//! canonical steps.

use serde::Serialize;

use loanflow_core::error::{CoreError, CoreResult};
use loanflow_core::status::ApplicationStatus;
use loanflow_core::types::Timestamp;
use loanflow_db::models::LoanApplication;

use crate::reconcile::ReconciledHistory;

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// The five logical stages of every loan timeline, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineStage {
    ApplicationSubmitted,
    ManagerApproval,
    FinanceApproval,
    LoanDisbursed,
    LoanCompleted,
}

impl TimelineStage {
    /// Every stage, in display order.
    pub const ALL: [TimelineStage; 5] = [
        Self::ApplicationSubmitted,
        Self::ManagerApproval,
        Self::FinanceApproval,
        Self::LoanDisbursed,
        Self::LoanCompleted,
    ];

    /// Display name of the stage.
    pub fn label(self) -> &'static str {
        match self {
            Self::ApplicationSubmitted => "Application Submitted",
            Self::ManagerApproval => "Manager Approval",
            Self::FinanceApproval => "Finance Approval",
            Self::LoanDisbursed => "Loan Disbursed",
            Self::LoanCompleted => "Loan Completed",
        }
    }

    /// Position on the happy path; equals the rank of the status this stage
    /// produces on success.
    fn rank(self) -> u8 {
        match self {
            Self::ApplicationSubmitted => 0,
            Self::ManagerApproval => 1,
            Self::FinanceApproval => 2,
            Self::LoanDisbursed => 3,
            Self::LoanCompleted => 4,
        }
    }

    /// The status this stage produces when it succeeds.
    fn success_status(self) -> ApplicationStatus {
        match self {
            Self::ApplicationSubmitted => ApplicationStatus::Pending,
            Self::ManagerApproval => ApplicationStatus::ManagerApproved,
            Self::FinanceApproval => ApplicationStatus::FinanceApproved,
            Self::LoanDisbursed => ApplicationStatus::Active,
            Self::LoanCompleted => ApplicationStatus::Completed,
        }
    }

    /// The rejection outcome belonging to this stage, if it has one.
    fn rejected_status(self) -> Option<ApplicationStatus> {
        match self {
            Self::ManagerApproval => Some(ApplicationStatus::ManagerRejected),
            Self::FinanceApproval => Some(ApplicationStatus::FinanceRejected),
            _ => None,
        }
    }

    /// The status whose next pending action is this stage.
    fn awaits(self) -> Option<ApplicationStatus> {
        match self {
            Self::ApplicationSubmitted => None,
            Self::ManagerApproval => Some(ApplicationStatus::Pending),
            Self::FinanceApproval => Some(ApplicationStatus::ManagerApproved),
            Self::LoanDisbursed => Some(ApplicationStatus::FinanceApproved),
            Self::LoanCompleted => Some(ApplicationStatus::Active),
        }
    }
}

/// Classification of one display stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Current,
    Rejected,
    Upcoming,
}

/// One display-ready timeline entry.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayStep {
    pub stage: TimelineStage,
    pub state: StepState,
    /// Formatted date, present on completed and rejected stages when the
    /// canonical step recovered an instant.
    pub date: Option<String>,
    pub comment: Option<String>,
    pub actor_name: Option<String>,
}

/// Format an instant the way the timeline displays it, e.g. `Mar 4, 2026`.
pub fn format_date(at: Timestamp) -> String {
    at.format("%b %-d, %Y").to_string()
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// How far along the happy path the application got, counting a rejection
/// as having completed the stages before it.
fn reached_rank(status: ApplicationStatus) -> u8 {
    match status.happy_path_rank() {
        Some(rank) => rank,
        None => match status {
            ApplicationStatus::ManagerRejected => 0,
            ApplicationStatus::FinanceRejected => 1,
            // happy_path_rank is None only for the rejected states.
            _ => unreachable!("status {status} has a happy-path rank"),
        },
    }
}

/// Classify the canonical steps of an application into the five display
/// stages.
///
/// The canonical history must agree with the application: a non-empty step
/// sequence ending anywhere other than the current status indicates
/// upstream corruption and fails with `InconsistentStatus` instead of
/// rendering.
pub fn present(
    application: &LoanApplication,
    history: &ReconciledHistory,
) -> CoreResult<Vec<DisplayStep>> {
    if let Some(last) = history.steps.last() {
        if last.status_to != application.status {
            return Err(CoreError::InconsistentStatus {
                application_id: application.id,
                detail: format!(
                    "history ends at {} but the application is {}",
                    last.status_to, application.status
                ),
            });
        }
    }

    let status = application.status;
    let reached = reached_rank(status);

    Ok(TimelineStage::ALL
        .into_iter()
        .map(|stage| {
            let state = if stage.rejected_status() == Some(status) {
                StepState::Rejected
            } else if reached >= stage.rank() {
                StepState::Completed
            } else if stage.awaits() == Some(status) {
                StepState::Current
            } else {
                StepState::Upcoming
            };

            let realized_status = match state {
                StepState::Rejected => stage.rejected_status(),
                StepState::Completed => Some(stage.success_status()),
                _ => None,
            };
            let step = realized_status
                .and_then(|target| history.steps.iter().find(|s| s.status_to == target));

            DisplayStep {
                stage,
                state,
                date: step.and_then(|s| s.changed_at).map(format_date),
                comment: step.and_then(|s| s.comment.clone()),
                actor_name: step.map(|s| s.actor_name.clone()),
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
