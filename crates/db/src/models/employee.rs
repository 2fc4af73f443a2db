//! Employee directory row model.

use serde::Serialize;
use sqlx::FromRow;

use loanflow_core::types::{DbId, Timestamp};

/// A row from the `employees` table.
///
/// The workflow engine only needs this for display-name resolution; the
/// `role` column holds the organizational role string
/// (`EMPLOYEE`, `MANAGER`, `FINANCE`, `ADMIN`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Employee {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: Option<String>,
    pub employee_code: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
