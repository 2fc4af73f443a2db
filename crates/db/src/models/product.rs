//! Loan product models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use loanflow_core::types::{DbId, Money, Timestamp};

/// A row from the `loan_products` table.
///
/// Terms are immutable once an application references the product, except
/// for [`is_active`](Self::is_active), which administrators may toggle to
/// close the product to new applications.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LoanProduct {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub max_amount: Money,
    /// Nominal annual interest rate in percent.
    pub interest_rate: f64,
    pub max_tenure_months: i32,
    pub eligibility: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Write DTO for loan products, used for both creation and edits: an edit
/// replaces every term, so the two writes share one shape.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLoanProduct {
    pub name: String,
    pub description: Option<String>,
    pub max_amount: Money,
    pub interest_rate: f64,
    pub max_tenure_months: i32,
    pub eligibility: Option<String>,
}
