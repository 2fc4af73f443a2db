//! Repository for the `loan_products` table.

use sqlx::PgPool;

use loanflow_core::types::DbId;

use crate::models::product::{CreateLoanProduct, LoanProduct};

/// Column list for loan_products queries.
const PRODUCT_COLUMNS: &str = "id, name, description, max_amount, interest_rate, \
    max_tenure_months, eligibility, is_active, created_at, updated_at";

/// Administrative CRUD for loan products.
///
/// Products are never deleted: rows referenced by applications must stay
/// resolvable, so retirement is [`set_active`](Self::set_active) with
/// `false`.
pub struct LoanProductRepo;

impl LoanProductRepo {
    /// Insert a new active loan product, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateLoanProduct,
    ) -> Result<LoanProduct, sqlx::Error> {
        let query = format!(
            "INSERT INTO loan_products
                (name, description, max_amount, interest_rate, max_tenure_months, eligibility)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, LoanProduct>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.max_amount)
            .bind(input.interest_rate)
            .bind(input.max_tenure_months)
            .bind(&input.eligibility)
            .fetch_one(pool)
            .await
    }

    /// Replace a product's descriptive fields and terms.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &CreateLoanProduct,
    ) -> Result<Option<LoanProduct>, sqlx::Error> {
        let query = format!(
            "UPDATE loan_products SET
                name = $2,
                description = $3,
                max_amount = $4,
                interest_rate = $5,
                max_tenure_months = $6,
                eligibility = $7,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, LoanProduct>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.max_amount)
            .bind(input.interest_rate)
            .bind(input.max_tenure_months)
            .bind(&input.eligibility)
            .fetch_optional(pool)
            .await
    }

    /// Find a product by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<LoanProduct>, sqlx::Error> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM loan_products WHERE id = $1");
        sqlx::query_as::<_, LoanProduct>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every product, active or not, ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<LoanProduct>, sqlx::Error> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM loan_products ORDER BY name ASC");
        sqlx::query_as::<_, LoanProduct>(&query).fetch_all(pool).await
    }

    /// List products currently open for applications, ordered by name.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<LoanProduct>, sqlx::Error> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM loan_products WHERE is_active ORDER BY name ASC"
        );
        sqlx::query_as::<_, LoanProduct>(&query).fetch_all(pool).await
    }

    /// Open or close a product for new applications.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<LoanProduct>, sqlx::Error> {
        let query = format!(
            "UPDATE loan_products SET is_active = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, LoanProduct>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }

    /// Whether any application references this product.
    pub async fn has_applications(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM loan_applications WHERE loan_product_id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
