//! The workflow engine: every mutation of a loan application goes through
//! here.
//!
//! Each operation follows the same shape: load, validate against the
//! transition table, compare-and-swap the application row, then append the
//! matching workflow event. Validation failures mutate nothing; a lost
//! compare-and-swap surfaces as `ConcurrentModification` and the loser's
//! event is never written.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use loanflow_core::emi::{self, EmiQuote};
use loanflow_core::error::{CoreError, CoreResult};
use loanflow_core::status::{ActorRole, ApplicationStatus};
use loanflow_core::types::{DbId, Money};
use loanflow_core::workflow::{
    self, DecisionOutcome, COMMENT_DISBURSED, COMMENT_REPAID, COMMENT_SUBMITTED,
};
use loanflow_db::models::{LoanApplication, NewLoanApplication, NewWorkflowEvent, StatusUpdate};

use crate::reconcile::{
    step_from_event, synthesize_history, HistoryProvenance, ReconciledHistory, SYSTEM_LABEL,
};
use crate::store::{ActorDirectory, ApplicationStore, EventStore, ProductCatalog};
use crate::timeline::{self, DisplayStep};

/// A submission request, before validation and pricing.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitApplication {
    pub loan_product_id: DbId,
    pub applicant_id: DbId,
    pub amount: Money,
    pub tenure_months: i32,
}

/// Drop empty and whitespace-only comments before they are stored.
fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// The engine, generic over its storage seams.
///
/// Cloning is cheap; clones share the same store.
pub struct WorkflowEngine<S> {
    store: Arc<S>,
}

impl<S> Clone for WorkflowEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> WorkflowEngine<S>
where
    S: ApplicationStore + EventStore + ActorDirectory + ProductCatalog,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Price the given terms against a product without creating anything.
    pub async fn quote(
        &self,
        loan_product_id: DbId,
        amount: Money,
        tenure_months: i32,
    ) -> CoreResult<EmiQuote> {
        let product = self.store.get_product(loan_product_id).await?;
        emi::validate_terms(product.max_amount, product.max_tenure_months, amount, tenure_months)?;
        emi::quote(amount, product.interest_rate, tenure_months)
    }

    /// Submit a new application.
    ///
    /// Validates the terms against the product, computes the installment
    /// once, creates the `PENDING` record, and appends the creation event.
    pub async fn submit(&self, input: SubmitApplication) -> CoreResult<LoanApplication> {
        let product = self.store.get_product(input.loan_product_id).await?;
        if !product.is_active {
            return Err(CoreError::InactiveProduct { id: product.id });
        }
        emi::validate_terms(
            product.max_amount,
            product.max_tenure_months,
            input.amount,
            input.tenure_months,
        )?;
        let installment = emi::compute_emi(input.amount, product.interest_rate, input.tenure_months)?;

        let application = self
            .store
            .insert(NewLoanApplication {
                loan_product_id: input.loan_product_id,
                applicant_id: input.applicant_id,
                applied_amount: input.amount,
                applied_tenure_months: input.tenure_months,
                emi: installment,
            })
            .await?;

        self.store
            .append(NewWorkflowEvent {
                application_id: application.id,
                status_from: None,
                status_to: ApplicationStatus::Pending,
                comment: Some(COMMENT_SUBMITTED.to_string()),
                actor_id: Some(input.applicant_id),
            })
            .await?;

        info!(
            application_id = application.id,
            applicant_id = input.applicant_id,
            product_id = product.id,
            amount = input.amount,
            emi = installment,
            "loan application submitted"
        );
        Ok(application)
    }

    // -----------------------------------------------------------------------
    // Review decisions
    // -----------------------------------------------------------------------

    /// Record a manager or finance review decision.
    ///
    /// The target status is derived from the role and outcome, so a caller
    /// can never push an application onto an edge its role does not own.
    pub async fn decide(
        &self,
        application_id: DbId,
        actor_id: DbId,
        role: ActorRole,
        outcome: DecisionOutcome,
        comment: Option<String>,
    ) -> CoreResult<LoanApplication> {
        let application = self.store.get(application_id).await?;
        let transition = workflow::decision_target(application.status, role, outcome)?;
        let comment = normalize_comment(comment);
        workflow::require_comment(transition.comment, comment.as_deref())?;

        let now = Utc::now();
        let mut update = StatusUpdate::to_status(transition.to);
        match role {
            ActorRole::Manager => update.manager_comment = comment.clone(),
            _ => update.finance_comment = comment.clone(),
        }
        match outcome {
            DecisionOutcome::Approve => update.approved_at = Some(now),
            DecisionOutcome::Reject => update.rejected_at = Some(now),
        }

        self.transition(application, transition.to, update, comment, Some(actor_id))
            .await
    }

    // -----------------------------------------------------------------------
    // Disbursement and completion
    // -----------------------------------------------------------------------

    /// Disburse an approved loan, moving it to `ACTIVE`.
    ///
    /// Performed by the system after funds transfer, or manually by a
    /// finance officer.
    pub async fn disburse(
        &self,
        application_id: DbId,
        role: ActorRole,
        actor_id: Option<DbId>,
    ) -> CoreResult<LoanApplication> {
        let application = self.store.get(application_id).await?;
        workflow::validate_transition(application.status, ApplicationStatus::Active, role)?;
        let mut update = StatusUpdate::to_status(ApplicationStatus::Active);
        update.approved_at = Some(Utc::now());
        self.transition(
            application,
            ApplicationStatus::Active,
            update,
            Some(COMMENT_DISBURSED.to_string()),
            actor_id,
        )
        .await
    }

    /// Close a fully repaid loan, moving it to `COMPLETED`.
    pub async fn complete(&self, application_id: DbId) -> CoreResult<LoanApplication> {
        let application = self.store.get(application_id).await?;
        workflow::validate_transition(
            application.status,
            ApplicationStatus::Completed,
            ActorRole::System,
        )?;
        let mut update = StatusUpdate::to_status(ApplicationStatus::Completed);
        update.completed_at = Some(Utc::now());
        self.transition(
            application,
            ApplicationStatus::Completed,
            update,
            Some(COMMENT_REPAID.to_string()),
            None,
        )
        .await
    }

    /// Apply a validated transition: compare-and-swap the row, then append
    /// the event. The event is written only after the swap succeeds, so a
    /// lost race leaves no trace in the log.
    async fn transition(
        &self,
        application: LoanApplication,
        to: ApplicationStatus,
        update: StatusUpdate,
        comment: Option<String>,
        actor_id: Option<DbId>,
    ) -> CoreResult<LoanApplication> {
        let from = application.status;
        let updated = self
            .store
            .compare_and_swap(application.id, from, update)
            .await?;
        self.store
            .append(NewWorkflowEvent {
                application_id: updated.id,
                status_from: Some(from),
                status_to: to,
                comment,
                actor_id,
            })
            .await?;
        info!(
            application_id = updated.id,
            from = %from,
            to = %to,
            actor_id,
            "application transitioned"
        );
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Load a single application.
    pub async fn application(&self, application_id: DbId) -> CoreResult<LoanApplication> {
        self.store.get(application_id).await
    }

    /// An applicant's applications, newest first.
    pub async fn applications_for(&self, applicant_id: DbId) -> CoreResult<Vec<LoanApplication>> {
        self.store.list_for_applicant(applicant_id).await
    }

    /// The applications awaiting action from `role`, oldest first.
    pub async fn review_queue(&self, role: ActorRole) -> CoreResult<Vec<LoanApplication>> {
        let status = match role {
            ActorRole::Manager => ApplicationStatus::Pending,
            ActorRole::Finance => ApplicationStatus::ManagerApproved,
            ActorRole::System => ApplicationStatus::FinanceApproved,
            _ => return Err(CoreError::NoReviewQueue { role }),
        };
        self.store.list_by_status(status).await
    }

    /// The canonical history of an application.
    ///
    /// Authoritative when the event log has entries; otherwise a
    /// deterministic reconstruction from the application's own fields. An
    /// unreadable event log is the one collaborator failure this degrades
    /// around instead of propagating.
    pub async fn history(&self, application_id: DbId) -> CoreResult<ReconciledHistory> {
        let application = self.store.get(application_id).await?;
        self.history_of(&application).await
    }

    async fn history_of(&self, application: &LoanApplication) -> CoreResult<ReconciledHistory> {
        let events = match self.store.list_for_application(application.id).await {
            Ok(events) => events,
            Err(err) => {
                warn!(
                    application_id = application.id,
                    error = %err,
                    "event log unavailable, reconstructing history"
                );
                Vec::new()
            }
        };

        if events.is_empty() {
            let applicant_name = self.store.display_name(application.applicant_id).await?;
            return Ok(ReconciledHistory {
                provenance: HistoryProvenance::Reconstructed,
                steps: synthesize_history(application, &applicant_name),
            });
        }

        let mut steps = Vec::with_capacity(events.len());
        for event in &events {
            let actor_name = match event.actor_id {
                Some(actor_id) => self.store.display_name(actor_id).await?,
                None => SYSTEM_LABEL.to_string(),
            };
            steps.push(step_from_event(event, actor_name));
        }
        Ok(ReconciledHistory {
            provenance: HistoryProvenance::Authoritative,
            steps,
        })
    }

    /// The display timeline of an application: five stages classified from
    /// its canonical history.
    pub async fn timeline(&self, application_id: DbId) -> CoreResult<Vec<DisplayStep>> {
        let application = self.store.get(application_id).await?;
        let history = self.history_of(&application).await?;
        timeline::present(&application, &history)
    }
}
