//! Stateless repositories over the loanflow schema.

pub mod application_repo;
pub mod employee_repo;
pub mod event_repo;
pub mod product_repo;

pub use application_repo::LoanApplicationRepo;
pub use employee_repo::EmployeeRepo;
pub use event_repo::WorkflowEventRepo;
pub use product_repo::LoanProductRepo;
