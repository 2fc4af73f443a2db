//! Row models and write DTOs for the loanflow schema.

pub mod application;
pub mod employee;
pub mod event;
pub mod product;

pub use application::{LoanApplication, NewLoanApplication, StatusUpdate};
pub use employee::Employee;
pub use event::{NewWorkflowEvent, WorkflowEvent};
pub use product::{CreateLoanProduct, LoanProduct};
