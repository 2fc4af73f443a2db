//! The loanflow workflow engine.
//!
//! An in-process engine driving loan applications through the approval
//! pipeline (submission → manager review → finance review → disbursement →
//! completion). It is built on three collaborator seams defined in
//! [`store`]:
//!
//! - [`ApplicationStore`](store::ApplicationStore) — application records,
//!   mutated only through a compare-and-swap on the current status.
//! - [`EventStore`](store::EventStore) — the append-only transition log.
//! - [`ActorDirectory`](store::ActorDirectory) — display-name resolution.
//!
//! [`WorkflowEngine`] performs the mutations; [`reconcile`] derives a
//! canonical step history (authoritative events, or a deterministic
//! reconstruction when the log is unavailable); [`timeline`] classifies the
//! canonical steps into the five display stages.

pub mod engine;
pub mod reconcile;
pub mod store;
pub mod timeline;

pub use engine::{SubmitApplication, WorkflowEngine};
pub use reconcile::{HistoryProvenance, ReconciledHistory, WorkflowStep};
pub use store::memory::MemoryStore;
pub use store::postgres::PgStore;
pub use timeline::{DisplayStep, StepState, TimelineStage};
