//! Collaborator seams of the workflow engine.
//!
//! The engine never talks to a database directly; it is generic over these
//! traits. [`postgres::PgStore`] is the production implementation,
//! [`memory::MemoryStore`] backs the test suites with identical semantics.

use std::future::Future;

use loanflow_core::error::CoreResult;
use loanflow_core::status::ApplicationStatus;
use loanflow_core::types::DbId;
use loanflow_db::models::{
    LoanApplication, LoanProduct, NewLoanApplication, NewWorkflowEvent, StatusUpdate,
    WorkflowEvent,
};

pub mod memory;
pub mod postgres;

/// Display name substituted for actor ids the directory cannot resolve.
pub const UNKNOWN_USER: &str = "Unknown User";

/// Loan application records.
///
/// Writes after creation go through [`compare_and_swap`](Self::compare_and_swap)
/// exclusively: the update applies only if the row's status still matches
/// the status the caller read, which serializes transitions per application
/// without locking readers.
pub trait ApplicationStore: Send + Sync {
    /// Load an application; absent ids are a `NotFound` error.
    fn get(&self, id: DbId) -> impl Future<Output = CoreResult<LoanApplication>> + Send;

    /// Insert a freshly submitted application in `PENDING` status.
    fn insert(
        &self,
        input: NewLoanApplication,
    ) -> impl Future<Output = CoreResult<LoanApplication>> + Send;

    /// Apply `update` if the application is still in `expected` status,
    /// returning the updated record; fails with `ConcurrentModification`
    /// when another transition won the race.
    fn compare_and_swap(
        &self,
        id: DbId,
        expected: ApplicationStatus,
        update: StatusUpdate,
    ) -> impl Future<Output = CoreResult<LoanApplication>> + Send;

    /// An applicant's applications, newest first.
    fn list_for_applicant(
        &self,
        applicant_id: DbId,
    ) -> impl Future<Output = CoreResult<Vec<LoanApplication>>> + Send;

    /// Applications sitting in `status`, oldest first.
    fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> impl Future<Output = CoreResult<Vec<LoanApplication>>> + Send;
}

/// The append-only workflow event log. The authoritative history when
/// present; the reconciler falls back to reconstruction when it is not.
pub trait EventStore: Send + Sync {
    /// Append exactly one event for a realized transition.
    fn append(
        &self,
        event: NewWorkflowEvent,
    ) -> impl Future<Output = CoreResult<WorkflowEvent>> + Send;

    /// An application's events, ascending by occurrence time.
    fn list_for_application(
        &self,
        application_id: DbId,
    ) -> impl Future<Output = CoreResult<Vec<WorkflowEvent>>> + Send;
}

/// Display-name resolution for workflow actors.
pub trait ActorDirectory: Send + Sync {
    /// Resolve an actor's display name; unknown ids resolve to
    /// [`UNKNOWN_USER`] rather than an error.
    fn display_name(&self, actor_id: DbId) -> impl Future<Output = CoreResult<String>> + Send;
}

/// Loan product lookup, needed at submission to validate terms and price
/// the installment.
pub trait ProductCatalog: Send + Sync {
    /// Load a product; absent ids are a `NotFound` error.
    fn get_product(&self, id: DbId) -> impl Future<Output = CoreResult<LoanProduct>> + Send;
}
