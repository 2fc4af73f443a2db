//! History reconciliation: one canonical step sequence per application.
//!
//! When the append-only event log is present it is the authoritative
//! history and maps 1:1 onto [`WorkflowStep`]s. When it is empty or
//! unavailable, [`synthesize_history`] reconstructs a best-effort sequence
//! from the application's own fields. The two sources are never mixed, and
//! [`ReconciledHistory::provenance`] tells consumers which one they got so
//! a reconstruction is not presented with more precision than it has.

use serde::Serialize;

use loanflow_core::status::ApplicationStatus;
use loanflow_core::types::Timestamp;
use loanflow_core::workflow::{COMMENT_DISBURSED, COMMENT_REPAID, COMMENT_SUBMITTED};
use loanflow_db::models::{LoanApplication, WorkflowEvent};

/// Actor label on reconstructed manager steps.
pub const MANAGER_LABEL: &str = "Manager";

/// Actor label on reconstructed finance steps.
pub const FINANCE_LABEL: &str = "Finance Officer";

/// Actor label on system-performed transitions.
pub const SYSTEM_LABEL: &str = "System";

// ---------------------------------------------------------------------------
// Canonical steps
// ---------------------------------------------------------------------------

/// One realized (or reconstructed) workflow transition.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStep {
    /// `None` for the submission step.
    pub status_from: Option<ApplicationStatus>,
    pub status_to: ApplicationStatus,
    pub comment: Option<String>,
    pub actor_name: String,
    /// `None` when a reconstruction could not recover the instant.
    pub changed_at: Option<Timestamp>,
}

/// Where a canonical step sequence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryProvenance {
    /// Mapped 1:1 from stored workflow events.
    Authoritative,
    /// Reconstructed from the application's status and summary fields.
    Reconstructed,
}

/// The canonical, ordered history of an application.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciledHistory {
    pub provenance: HistoryProvenance,
    pub steps: Vec<WorkflowStep>,
}

impl ReconciledHistory {
    /// Whether this history was reconstructed rather than read from the
    /// event log.
    pub fn is_reconstructed(&self) -> bool {
        self.provenance == HistoryProvenance::Reconstructed
    }
}

/// Map one stored event onto a canonical step.
///
/// The caller resolves `actor_name`; events without an actor are
/// system-performed.
pub fn step_from_event(event: &WorkflowEvent, actor_name: String) -> WorkflowStep {
    WorkflowStep {
        status_from: event.status_from,
        status_to: event.status_to,
        comment: event.comment.clone(),
        actor_name,
        changed_at: Some(event.occurred_at),
    }
}

// ---------------------------------------------------------------------------
// Fallback synthesis
// ---------------------------------------------------------------------------

/// Reconstruct an application's history from its own fields.
///
/// Deterministic: the same application always yields the same steps. The
/// model stores a single approval instant shared by the manager and finance
/// stages, so reconstructed decision steps can carry the same timestamp;
/// only authoritative events can tell the two stages apart.
pub fn synthesize_history(
    application: &LoanApplication,
    applicant_name: &str,
) -> Vec<WorkflowStep> {
    let status = application.status;
    let decided_at = application.approved_at.or(application.rejected_at);

    let mut steps = vec![WorkflowStep {
        status_from: None,
        status_to: ApplicationStatus::Pending,
        comment: Some(COMMENT_SUBMITTED.to_string()),
        actor_name: applicant_name.to_string(),
        changed_at: Some(application.applied_at),
    }];

    // Manager decision: every status past PENDING implies one.
    if status != ApplicationStatus::Pending {
        let status_to = if status == ApplicationStatus::ManagerRejected {
            ApplicationStatus::ManagerRejected
        } else {
            ApplicationStatus::ManagerApproved
        };
        steps.push(WorkflowStep {
            status_from: Some(ApplicationStatus::Pending),
            status_to,
            comment: application.manager_comment.clone(),
            actor_name: MANAGER_LABEL.to_string(),
            changed_at: decided_at,
        });
    }

    // Finance decision.
    if matches!(
        status,
        ApplicationStatus::FinanceApproved
            | ApplicationStatus::FinanceRejected
            | ApplicationStatus::Active
            | ApplicationStatus::Completed
    ) {
        let status_to = if status == ApplicationStatus::FinanceRejected {
            ApplicationStatus::FinanceRejected
        } else {
            ApplicationStatus::FinanceApproved
        };
        steps.push(WorkflowStep {
            status_from: Some(ApplicationStatus::ManagerApproved),
            status_to,
            comment: application.finance_comment.clone(),
            actor_name: FINANCE_LABEL.to_string(),
            changed_at: decided_at,
        });
    }

    // Disbursement.
    if matches!(
        status,
        ApplicationStatus::Active | ApplicationStatus::Completed
    ) {
        steps.push(WorkflowStep {
            status_from: Some(ApplicationStatus::FinanceApproved),
            status_to: ApplicationStatus::Active,
            comment: Some(COMMENT_DISBURSED.to_string()),
            actor_name: SYSTEM_LABEL.to_string(),
            changed_at: application.approved_at,
        });
    }

    // Completion.
    if status == ApplicationStatus::Completed {
        steps.push(WorkflowStep {
            status_from: Some(ApplicationStatus::Active),
            status_to: ApplicationStatus::Completed,
            comment: Some(COMMENT_REPAID.to_string()),
            actor_name: SYSTEM_LABEL.to_string(),
            changed_at: application.completed_at,
        });
    }

    steps
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use loanflow_core::status::ApplicationStatus::*;

    fn application(status: ApplicationStatus) -> LoanApplication {
        let applied_at = Utc::now() - Duration::days(10);
        let decided_at = applied_at + Duration::days(2);
        let mut app = LoanApplication {
            id: 7,
            loan_product_id: 1,
            applicant_id: 3,
            applied_amount: 100_000,
            applied_tenure_months: 12,
            emi: 8_885,
            status,
            manager_comment: None,
            finance_comment: None,
            applied_at,
            approved_at: None,
            rejected_at: None,
            completed_at: None,
        };
        match status {
            Pending => {}
            ManagerRejected | FinanceRejected => {
                app.rejected_at = Some(decided_at);
                if status == FinanceRejected {
                    app.approved_at = Some(decided_at);
                }
            }
            ManagerApproved | FinanceApproved | Active => {
                app.approved_at = Some(decided_at);
            }
            Completed => {
                app.approved_at = Some(decided_at);
                app.completed_at = Some(decided_at + Duration::days(365));
            }
        }
        app
    }

    fn targets(steps: &[WorkflowStep]) -> Vec<ApplicationStatus> {
        steps.iter().map(|s| s.status_to).collect()
    }

    #[test]
    fn test_pending_yields_submission_only() {
        let steps = synthesize_history(&application(Pending), "Asha Rao");
        assert_eq!(targets(&steps), vec![Pending]);
        assert_eq!(steps[0].actor_name, "Asha Rao");
        assert_eq!(steps[0].comment.as_deref(), Some(COMMENT_SUBMITTED));
        assert!(steps[0].status_from.is_none());
    }

    #[test]
    fn test_manager_approved_yields_two_steps() {
        let steps = synthesize_history(&application(ManagerApproved), "Asha Rao");
        assert_eq!(targets(&steps), vec![Pending, ManagerApproved]);
        assert_eq!(steps[1].actor_name, MANAGER_LABEL);
        assert_eq!(steps[1].status_from, Some(Pending));
    }

    #[test]
    fn test_manager_rejected_yields_two_steps() {
        let mut app = application(ManagerRejected);
        app.manager_comment = Some("Debt ratio too high".to_string());
        let steps = synthesize_history(&app, "Asha Rao");
        assert_eq!(targets(&steps), vec![Pending, ManagerRejected]);
        assert_eq!(steps[1].comment.as_deref(), Some("Debt ratio too high"));
        assert_eq!(steps[1].changed_at, app.rejected_at);
    }

    #[test]
    fn test_finance_approved_yields_three_steps() {
        let steps = synthesize_history(&application(FinanceApproved), "Asha Rao");
        assert_eq!(
            targets(&steps),
            vec![Pending, ManagerApproved, FinanceApproved]
        );
        assert_eq!(steps[2].actor_name, FINANCE_LABEL);
    }

    #[test]
    fn test_finance_rejected_yields_three_steps() {
        let steps = synthesize_history(&application(FinanceRejected), "Asha Rao");
        assert_eq!(
            targets(&steps),
            vec![Pending, ManagerApproved, FinanceRejected]
        );
        // The shared decision timestamp cannot distinguish the stages.
        assert_eq!(steps[1].changed_at, steps[2].changed_at);
    }

    #[test]
    fn test_active_yields_four_steps() {
        let steps = synthesize_history(&application(Active), "Asha Rao");
        assert_eq!(
            targets(&steps),
            vec![Pending, ManagerApproved, FinanceApproved, Active]
        );
        assert_eq!(steps[3].actor_name, SYSTEM_LABEL);
        assert_eq!(steps[3].comment.as_deref(), Some(COMMENT_DISBURSED));
    }

    #[test]
    fn test_completed_yields_all_five_steps() {
        let app = application(Completed);
        let steps = synthesize_history(&app, "Asha Rao");
        assert_eq!(
            targets(&steps),
            vec![Pending, ManagerApproved, FinanceApproved, Active, Completed]
        );
        assert_eq!(steps[4].comment.as_deref(), Some(COMMENT_REPAID));
        assert_eq!(steps[4].changed_at, app.completed_at);
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let app = application(Active);
        let a = synthesize_history(&app, "Asha Rao");
        let b = synthesize_history(&app, "Asha Rao");
        assert_eq!(targets(&a), targets(&b));
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.changed_at, y.changed_at);
            assert_eq!(x.comment, y.comment);
        }
    }
}
