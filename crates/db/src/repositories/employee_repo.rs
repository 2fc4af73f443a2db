//! Repository for the `employees` directory table.

use sqlx::PgPool;

use loanflow_core::types::DbId;

use crate::models::employee::Employee;

/// Column list for employees queries.
const EMPLOYEE_COLUMNS: &str =
    "id, name, email, role, department, employee_code, created_at, updated_at";

/// Read operations for the employee directory.
pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Find an employee by their ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve an employee's display name, if the id is known.
    pub async fn display_name(pool: &PgPool, id: DbId) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT name FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
