//! The approval pipeline state machine.
//!
//! [`TRANSITIONS`] is the single source of truth for which status changes
//! are legal, who may perform them, and whether a comment is required.
//! The engine validates every mutation against this table; the timeline
//! presenter derives its stage classification from the same ordering.

use crate::error::{CoreError, CoreResult};
use crate::status::{ActorRole, ApplicationStatus};

// ---------------------------------------------------------------------------
// Well-known system comments
// ---------------------------------------------------------------------------

/// Comment recorded on the creation event.
pub const COMMENT_SUBMITTED: &str = "Application submitted";

/// Comment recorded when the loan is disbursed.
pub const COMMENT_DISBURSED: &str = "Loan disbursed";

/// Comment recorded when the final repayment closes the loan.
pub const COMMENT_REPAID: &str = "Loan fully repaid";

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Whether a transition carries a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentRule {
    /// The engine supplies a fixed system comment.
    None,
    /// The actor may attach a comment.
    Optional,
    /// The actor must supply a non-empty comment (rejection reason).
    Required,
}

/// One legal edge of the workflow state machine.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    /// Prior status, or `None` for the creation edge.
    pub from: Option<ApplicationStatus>,
    pub to: ApplicationStatus,
    /// Roles authorized to perform this transition.
    pub actors: &'static [ActorRole],
    pub comment: CommentRule,
}

/// Every legal transition of the pipeline.
pub const TRANSITIONS: &[Transition] = &[
    Transition {
        from: None,
        to: ApplicationStatus::Pending,
        actors: &[ActorRole::Applicant],
        comment: CommentRule::None,
    },
    Transition {
        from: Some(ApplicationStatus::Pending),
        to: ApplicationStatus::ManagerApproved,
        actors: &[ActorRole::Manager],
        comment: CommentRule::Optional,
    },
    Transition {
        from: Some(ApplicationStatus::Pending),
        to: ApplicationStatus::ManagerRejected,
        actors: &[ActorRole::Manager],
        comment: CommentRule::Required,
    },
    Transition {
        from: Some(ApplicationStatus::ManagerApproved),
        to: ApplicationStatus::FinanceApproved,
        actors: &[ActorRole::Finance],
        comment: CommentRule::Optional,
    },
    Transition {
        from: Some(ApplicationStatus::ManagerApproved),
        to: ApplicationStatus::FinanceRejected,
        actors: &[ActorRole::Finance],
        comment: CommentRule::Required,
    },
    Transition {
        from: Some(ApplicationStatus::FinanceApproved),
        to: ApplicationStatus::Active,
        actors: &[ActorRole::System, ActorRole::Finance],
        comment: CommentRule::None,
    },
    Transition {
        from: Some(ApplicationStatus::Active),
        to: ApplicationStatus::Completed,
        actors: &[ActorRole::System],
        comment: CommentRule::None,
    },
];

// ---------------------------------------------------------------------------
// Lookup & validation
// ---------------------------------------------------------------------------

/// Find the table row for a status change, ignoring the actor.
pub fn find_transition(
    from: Option<ApplicationStatus>,
    to: ApplicationStatus,
) -> Option<&'static Transition> {
    TRANSITIONS.iter().find(|t| t.from == from && t.to == to)
}

/// Validate a status change including the actor's authorization.
///
/// Fails with [`CoreError::IllegalTransition`] when the edge does not exist
/// or the role is not authorized for it. Nothing is mutated on failure.
pub fn validate_transition(
    from: ApplicationStatus,
    to: ApplicationStatus,
    role: ActorRole,
) -> CoreResult<&'static Transition> {
    let transition = find_transition(Some(from), to).ok_or_else(|| {
        CoreError::IllegalTransition(format!("no transition from {from} to {to}"))
    })?;
    if !transition.actors.contains(&role) {
        return Err(CoreError::IllegalTransition(format!(
            "role {role} is not authorized to move an application from {from} to {to}"
        )));
    }
    Ok(transition)
}

/// All statuses reachable in one step from `from`.
pub fn legal_targets(from: ApplicationStatus) -> Vec<ApplicationStatus> {
    TRANSITIONS
        .iter()
        .filter(|t| t.from == Some(from))
        .map(|t| t.to)
        .collect()
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// Outcome of a manager or finance review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionOutcome {
    Approve,
    Reject,
}

/// Resolve the target status of a review decision and validate it against
/// the transition table.
///
/// Only managers decide on `PENDING` applications and only finance officers
/// decide on `MANAGER_APPROVED` ones; everything else is an illegal
/// transition.
pub fn decision_target(
    current: ApplicationStatus,
    role: ActorRole,
    outcome: DecisionOutcome,
) -> CoreResult<&'static Transition> {
    let target = match (role, outcome) {
        (ActorRole::Manager, DecisionOutcome::Approve) => ApplicationStatus::ManagerApproved,
        (ActorRole::Manager, DecisionOutcome::Reject) => ApplicationStatus::ManagerRejected,
        (ActorRole::Finance, DecisionOutcome::Approve) => ApplicationStatus::FinanceApproved,
        (ActorRole::Finance, DecisionOutcome::Reject) => ApplicationStatus::FinanceRejected,
        _ => {
            return Err(CoreError::IllegalTransition(format!(
                "role {role} does not take review decisions"
            )))
        }
    };
    validate_transition(current, target, role)
}

/// Enforce a transition's comment rule before any mutation.
///
/// An empty or whitespace-only comment does not satisfy
/// [`CommentRule::Required`].
pub fn require_comment(rule: CommentRule, comment: Option<&str>) -> CoreResult<()> {
    if rule == CommentRule::Required
        && comment.map_or(true, |c| c.trim().is_empty())
    {
        return Err(CoreError::MissingRequiredComment);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_terminal_statuses_have_no_outgoing_edges() {
        for status in ApplicationStatus::ALL {
            if status.is_terminal() {
                assert!(
                    legal_targets(status).is_empty(),
                    "{status} should be terminal"
                );
            }
        }
    }

    #[test]
    fn test_non_terminal_statuses_have_outgoing_edges() {
        for status in ApplicationStatus::ALL {
            if !status.is_terminal() {
                assert!(!legal_targets(status).is_empty(), "{status} is stuck");
            }
        }
    }

    #[test]
    fn test_creation_edge_exists_only_into_pending() {
        let creation: Vec<_> = TRANSITIONS.iter().filter(|t| t.from.is_none()).collect();
        assert_eq!(creation.len(), 1);
        assert_eq!(creation[0].to, ApplicationStatus::Pending);
        assert_eq!(creation[0].actors, &[ActorRole::Applicant]);
    }

    #[test]
    fn test_manager_decides_pending_applications() {
        let approve = decision_target(
            ApplicationStatus::Pending,
            ActorRole::Manager,
            DecisionOutcome::Approve,
        )
        .unwrap();
        assert_eq!(approve.to, ApplicationStatus::ManagerApproved);
        assert_eq!(approve.comment, CommentRule::Optional);

        let reject = decision_target(
            ApplicationStatus::Pending,
            ActorRole::Manager,
            DecisionOutcome::Reject,
        )
        .unwrap();
        assert_eq!(reject.to, ApplicationStatus::ManagerRejected);
        assert_eq!(reject.comment, CommentRule::Required);
    }

    #[test]
    fn test_finance_decides_manager_approved_applications() {
        let approve = decision_target(
            ApplicationStatus::ManagerApproved,
            ActorRole::Finance,
            DecisionOutcome::Approve,
        )
        .unwrap();
        assert_eq!(approve.to, ApplicationStatus::FinanceApproved);
    }

    #[test]
    fn test_manager_cannot_decide_outside_pending() {
        for status in ApplicationStatus::ALL {
            if status == ApplicationStatus::Pending {
                continue;
            }
            assert_matches!(
                decision_target(status, ActorRole::Manager, DecisionOutcome::Approve),
                Err(CoreError::IllegalTransition(_)),
                "manager decision on {status} should be illegal"
            );
        }
    }

    #[test]
    fn test_finance_cannot_decide_pending() {
        assert_matches!(
            decision_target(
                ApplicationStatus::Pending,
                ActorRole::Finance,
                DecisionOutcome::Approve
            ),
            Err(CoreError::IllegalTransition(_))
        );
    }

    #[test]
    fn test_non_reviewing_roles_cannot_decide() {
        for role in [ActorRole::Applicant, ActorRole::System, ActorRole::Admin] {
            assert_matches!(
                decision_target(ApplicationStatus::Pending, role, DecisionOutcome::Approve),
                Err(CoreError::IllegalTransition(_))
            );
        }
    }

    #[test]
    fn test_disbursement_allows_system_and_finance() {
        assert!(validate_transition(
            ApplicationStatus::FinanceApproved,
            ApplicationStatus::Active,
            ActorRole::System
        )
        .is_ok());
        assert!(validate_transition(
            ApplicationStatus::FinanceApproved,
            ApplicationStatus::Active,
            ActorRole::Finance
        )
        .is_ok());
        assert_matches!(
            validate_transition(
                ApplicationStatus::FinanceApproved,
                ApplicationStatus::Active,
                ActorRole::Manager
            ),
            Err(CoreError::IllegalTransition(_))
        );
    }

    #[test]
    fn test_completion_is_system_only() {
        assert!(validate_transition(
            ApplicationStatus::Active,
            ApplicationStatus::Completed,
            ActorRole::System
        )
        .is_ok());
        assert_matches!(
            validate_transition(
                ApplicationStatus::Active,
                ApplicationStatus::Completed,
                ActorRole::Finance
            ),
            Err(CoreError::IllegalTransition(_))
        );
    }

    #[test]
    fn test_rejection_requires_substantive_comment() {
        assert_matches!(
            require_comment(CommentRule::Required, None),
            Err(CoreError::MissingRequiredComment)
        );
        assert_matches!(
            require_comment(CommentRule::Required, Some("")),
            Err(CoreError::MissingRequiredComment)
        );
        assert_matches!(
            require_comment(CommentRule::Required, Some("   \t")),
            Err(CoreError::MissingRequiredComment)
        );
        assert!(require_comment(CommentRule::Required, Some("Salary too low")).is_ok());
    }

    #[test]
    fn test_optional_comment_accepts_absence() {
        assert!(require_comment(CommentRule::Optional, None).is_ok());
        assert!(require_comment(CommentRule::None, None).is_ok());
    }

    #[test]
    fn test_every_transition_reaches_a_status_on_the_table() {
        // Walking forward from PENDING must reach every non-terminal status.
        let mut reachable = vec![ApplicationStatus::Pending];
        let mut frontier = vec![ApplicationStatus::Pending];
        while let Some(status) = frontier.pop() {
            for next in legal_targets(status) {
                if !reachable.contains(&next) {
                    reachable.push(next);
                    frontier.push(next);
                }
            }
        }
        for status in ApplicationStatus::ALL {
            assert!(reachable.contains(&status), "{status} is unreachable");
        }
    }
}
