//! Loan application row model and write DTOs.
//!
//! The `status` column is TEXT in the database; [`LoanApplication`] decodes
//! it into [`ApplicationStatus`] at the row boundary so no other layer
//! handles raw status strings.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use loanflow_core::status::ApplicationStatus;
use loanflow_core::types::{DbId, Money, Timestamp};

/// A row from the `loan_applications` table.
#[derive(Debug, Clone, Serialize)]
pub struct LoanApplication {
    pub id: DbId,
    pub loan_product_id: DbId,
    pub applicant_id: DbId,
    pub applied_amount: Money,
    pub applied_tenure_months: i32,
    /// Monthly installment, computed once at submission and never updated.
    pub emi: Money,
    pub status: ApplicationStatus,
    pub manager_comment: Option<String>,
    pub finance_comment: Option<String>,
    pub applied_at: Timestamp,
    /// Most recent approval instant (manager approval, finance approval,
    /// or disbursement).
    pub approved_at: Option<Timestamp>,
    pub rejected_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl<'r> FromRow<'r, PgRow> for LoanApplication {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status_raw: String = row.try_get("status")?;
        let status = ApplicationStatus::parse(&status_raw).map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            }
        })?;
        Ok(Self {
            id: row.try_get("id")?,
            loan_product_id: row.try_get("loan_product_id")?,
            applicant_id: row.try_get("applicant_id")?,
            applied_amount: row.try_get("applied_amount")?,
            applied_tenure_months: row.try_get("applied_tenure_months")?,
            emi: row.try_get("emi")?,
            status,
            manager_comment: row.try_get("manager_comment")?,
            finance_comment: row.try_get("finance_comment")?,
            applied_at: row.try_get("applied_at")?,
            approved_at: row.try_get("approved_at")?,
            rejected_at: row.try_get("rejected_at")?,
            completed_at: row.try_get("completed_at")?,
        })
    }
}

/// DTO for inserting a submitted application.
///
/// The status is always `PENDING` and `applied_at` is set by the database.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLoanApplication {
    pub loan_product_id: DbId,
    pub applicant_id: DbId,
    pub applied_amount: Money,
    pub applied_tenure_months: i32,
    pub emi: Money,
}

/// The write set of one workflow transition, applied with a
/// compare-and-swap on the current status.
///
/// `None` fields are left untouched by the update.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
    pub manager_comment: Option<String>,
    pub finance_comment: Option<String>,
    pub approved_at: Option<Timestamp>,
    pub rejected_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl StatusUpdate {
    /// Start a transition write set targeting `status`.
    pub fn to_status(status: ApplicationStatus) -> Self {
        Self {
            status,
            manager_comment: None,
            finance_comment: None,
            approved_at: None,
            rejected_at: None,
            completed_at: None,
        }
    }
}
