//! Repository for the `loan_applications` table.

use sqlx::PgPool;

use loanflow_core::status::ApplicationStatus;
use loanflow_core::types::DbId;

use crate::models::application::{LoanApplication, NewLoanApplication, StatusUpdate};

/// Column list for loan_applications queries.
const APPLICATION_COLUMNS: &str = "id, loan_product_id, applicant_id, applied_amount, \
    applied_tenure_months, emi, status, manager_comment, finance_comment, \
    applied_at, approved_at, rejected_at, completed_at";

/// Provides CRUD and compare-and-swap operations for loan applications.
pub struct LoanApplicationRepo;

impl LoanApplicationRepo {
    /// Insert a submitted application in `PENDING` status, returning the
    /// created row.
    pub async fn create(
        pool: &PgPool,
        input: &NewLoanApplication,
    ) -> Result<LoanApplication, sqlx::Error> {
        let query = format!(
            "INSERT INTO loan_applications
                (loan_product_id, applicant_id, applied_amount, applied_tenure_months, emi, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {APPLICATION_COLUMNS}"
        );
        sqlx::query_as::<_, LoanApplication>(&query)
            .bind(input.loan_product_id)
            .bind(input.applicant_id)
            .bind(input.applied_amount)
            .bind(input.applied_tenure_months)
            .bind(input.emi)
            .bind(ApplicationStatus::Pending.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find an application by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<LoanApplication>, sqlx::Error> {
        let query = format!("SELECT {APPLICATION_COLUMNS} FROM loan_applications WHERE id = $1");
        sqlx::query_as::<_, LoanApplication>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an applicant's applications, newest first.
    pub async fn list_for_applicant(
        pool: &PgPool,
        applicant_id: DbId,
    ) -> Result<Vec<LoanApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM loan_applications
             WHERE applicant_id = $1
             ORDER BY applied_at DESC"
        );
        sqlx::query_as::<_, LoanApplication>(&query)
            .bind(applicant_id)
            .fetch_all(pool)
            .await
    }

    /// List applications in a given status, oldest first (review queues).
    pub async fn list_by_status(
        pool: &PgPool,
        status: ApplicationStatus,
    ) -> Result<Vec<LoanApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM loan_applications
             WHERE status = $1
             ORDER BY applied_at ASC"
        );
        sqlx::query_as::<_, LoanApplication>(&query)
            .bind(status.as_str())
            .fetch_all(pool)
            .await
    }

    /// Apply a transition's write set if and only if the row is still in
    /// `expected` status.
    ///
    /// Returns `None` when the guard fails (zero rows updated): the caller
    /// distinguishes a concurrent modification from a missing row by
    /// re-reading. Comment and timestamp fields are only written when the
    /// update provides them.
    pub async fn compare_and_swap_status(
        pool: &PgPool,
        id: DbId,
        expected: ApplicationStatus,
        update: &StatusUpdate,
    ) -> Result<Option<LoanApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE loan_applications SET
                status = $3,
                manager_comment = COALESCE($4, manager_comment),
                finance_comment = COALESCE($5, finance_comment),
                approved_at = COALESCE($6, approved_at),
                rejected_at = COALESCE($7, rejected_at),
                completed_at = COALESCE($8, completed_at)
             WHERE id = $1 AND status = $2
             RETURNING {APPLICATION_COLUMNS}"
        );
        sqlx::query_as::<_, LoanApplication>(&query)
            .bind(id)
            .bind(expected.as_str())
            .bind(update.status.as_str())
            .bind(&update.manager_comment)
            .bind(&update.finance_comment)
            .bind(update.approved_at)
            .bind(update.rejected_at)
            .bind(update.completed_at)
            .fetch_optional(pool)
            .await
    }
}
