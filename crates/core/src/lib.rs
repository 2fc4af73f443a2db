//! Pure domain logic for the loanflow workflow engine.
//!
//! This crate has no I/O. It defines:
//!
//! - [`status`] — the closed loan application status vocabulary and the
//!   actor roles that drive it.
//! - [`workflow`] — the transition table of the approval pipeline and the
//!   validation helpers the engine runs before any mutation.
//! - [`emi`] — the equated-monthly-installment calculator and term bounds
//!   validation.
//! - [`error`] — the [`CoreError`](error::CoreError) taxonomy shared by
//!   every layer.

pub mod emi;
pub mod error;
pub mod status;
pub mod types;
pub mod workflow;
