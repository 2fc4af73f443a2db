//! Workflow event row model.
//!
//! The `workflow_events` table is the authoritative, append-only history of
//! realized transitions: one row per status change, never mutated or
//! deleted.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use loanflow_core::status::ApplicationStatus;
use loanflow_core::types::{DbId, Timestamp};

/// A row from the `workflow_events` table.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowEvent {
    pub id: DbId,
    pub application_id: DbId,
    /// `None` for the creation event.
    pub status_from: Option<ApplicationStatus>,
    pub status_to: ApplicationStatus,
    pub comment: Option<String>,
    /// `None` for transitions performed by the system.
    pub actor_id: Option<DbId>,
    pub occurred_at: Timestamp,
}

impl<'r> FromRow<'r, PgRow> for WorkflowEvent {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let decode = |index: &str, value: String| {
            ApplicationStatus::parse(&value).map_err(|e| sqlx::Error::ColumnDecode {
                index: index.to_string(),
                source: Box::new(e),
            })
        };
        let status_from = row
            .try_get::<Option<String>, _>("status_from")?
            .map(|v| decode("status_from", v))
            .transpose()?;
        let status_to = decode("status_to", row.try_get("status_to")?)?;
        Ok(Self {
            id: row.try_get("id")?,
            application_id: row.try_get("application_id")?,
            status_from,
            status_to,
            comment: row.try_get("comment")?,
            actor_id: row.try_get("actor_id")?,
            occurred_at: row.try_get("occurred_at")?,
        })
    }
}

/// DTO for appending a workflow event; `occurred_at` is set by the database.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWorkflowEvent {
    pub application_id: DbId,
    pub status_from: Option<ApplicationStatus>,
    pub status_to: ApplicationStatus,
    pub comment: Option<String>,
    pub actor_id: Option<DbId>,
}
