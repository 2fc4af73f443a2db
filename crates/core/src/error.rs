use crate::status::ActorRole;
use crate::types::DbId;

/// Domain error taxonomy shared by every layer.
///
/// Input-validation and policy errors (`InvalidAmount`, `InvalidTenure`,
/// `IllegalTransition`, `MissingRequiredComment`) are reported before any
/// mutation is attempted. `ConcurrentModification` is transient and
/// caller-retriable. `InconsistentStatus` indicates upstream data corruption
/// and is fatal to the request that hit it.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid tenure: {0}")]
    InvalidTenure(String),

    #[error("Illegal transition: {0}")]
    IllegalTransition(String),

    #[error("A rejection requires a non-empty comment")]
    MissingRequiredComment,

    #[error("Role {role} has no review queue")]
    NoReviewQueue { role: ActorRole },

    #[error("Application {application_id} was modified concurrently; re-read and retry")]
    ConcurrentModification { application_id: DbId },

    #[error("Inconsistent workflow state for application {application_id}: {detail}")]
    InconsistentStatus { application_id: DbId, detail: String },

    #[error("Loan product {id} is not accepting applications")]
    InactiveProduct { id: DbId },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Unknown application status '{0}'")]
    UnknownStatus(String),

    #[error("Store error: {0}")]
    Store(String),
}

/// Convenience alias used throughout the workspace.
pub type CoreResult<T> = Result<T, CoreError>;
