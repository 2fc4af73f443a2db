//! Repository for the append-only `workflow_events` table.

use sqlx::PgPool;

use loanflow_core::types::DbId;

use crate::models::event::{NewWorkflowEvent, WorkflowEvent};

/// Column list for workflow_events queries.
const EVENT_COLUMNS: &str =
    "id, application_id, status_from, status_to, comment, actor_id, occurred_at";

/// Append and read operations for workflow events. There is deliberately no
/// update or delete.
pub struct WorkflowEventRepo;

impl WorkflowEventRepo {
    /// Append one realized transition, returning the stored row.
    pub async fn append(
        pool: &PgPool,
        input: &NewWorkflowEvent,
    ) -> Result<WorkflowEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO workflow_events
                (application_id, status_from, status_to, comment, actor_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {EVENT_COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowEvent>(&query)
            .bind(input.application_id)
            .bind(input.status_from.map(|s| s.as_str()))
            .bind(input.status_to.as_str())
            .bind(&input.comment)
            .bind(input.actor_id)
            .fetch_one(pool)
            .await
    }

    /// List an application's history, ascending by occurrence time.
    ///
    /// The insertion id breaks ties so transitions recorded within the same
    /// timestamp granularity keep their append order.
    pub async fn list_for_application(
        pool: &PgPool,
        application_id: DbId,
    ) -> Result<Vec<WorkflowEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM workflow_events
             WHERE application_id = $1
             ORDER BY occurred_at ASC, id ASC"
        );
        sqlx::query_as::<_, WorkflowEvent>(&query)
            .bind(application_id)
            .fetch_all(pool)
            .await
    }
}
