//! Postgres-backed store implementation over the loanflow-db repositories.

use loanflow_core::error::{CoreError, CoreResult};
use loanflow_core::status::ApplicationStatus;
use loanflow_core::types::DbId;
use loanflow_db::models::{
    LoanApplication, LoanProduct, NewLoanApplication, NewWorkflowEvent, StatusUpdate,
    WorkflowEvent,
};
use loanflow_db::repositories::{
    EmployeeRepo, LoanApplicationRepo, LoanProductRepo, WorkflowEventRepo,
};
use loanflow_db::DbPool;

use super::{ActorDirectory, ApplicationStore, EventStore, ProductCatalog, UNKNOWN_USER};

/// Production store: every seam backed by the same connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Surface a database failure as a typed store error.
fn store_err(err: sqlx::Error) -> CoreError {
    CoreError::Store(err.to_string())
}

impl ApplicationStore for PgStore {
    async fn get(&self, id: DbId) -> CoreResult<LoanApplication> {
        LoanApplicationRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_err)?
            .ok_or(CoreError::NotFound {
                entity: "LoanApplication",
                id,
            })
    }

    async fn insert(&self, input: NewLoanApplication) -> CoreResult<LoanApplication> {
        LoanApplicationRepo::create(&self.pool, &input)
            .await
            .map_err(store_err)
    }

    async fn compare_and_swap(
        &self,
        id: DbId,
        expected: ApplicationStatus,
        update: StatusUpdate,
    ) -> CoreResult<LoanApplication> {
        let updated = LoanApplicationRepo::compare_and_swap_status(&self.pool, id, expected, &update)
            .await
            .map_err(store_err)?;
        match updated {
            Some(application) => Ok(application),
            // Zero rows: either the row is gone or the status moved under
            // us. Re-read to report the right error.
            None => match LoanApplicationRepo::find_by_id(&self.pool, id)
                .await
                .map_err(store_err)?
            {
                Some(_) => Err(CoreError::ConcurrentModification { application_id: id }),
                None => Err(CoreError::NotFound {
                    entity: "LoanApplication",
                    id,
                }),
            },
        }
    }

    async fn list_for_applicant(&self, applicant_id: DbId) -> CoreResult<Vec<LoanApplication>> {
        LoanApplicationRepo::list_for_applicant(&self.pool, applicant_id)
            .await
            .map_err(store_err)
    }

    async fn list_by_status(&self, status: ApplicationStatus) -> CoreResult<Vec<LoanApplication>> {
        LoanApplicationRepo::list_by_status(&self.pool, status)
            .await
            .map_err(store_err)
    }
}

impl EventStore for PgStore {
    async fn append(&self, event: NewWorkflowEvent) -> CoreResult<WorkflowEvent> {
        WorkflowEventRepo::append(&self.pool, &event)
            .await
            .map_err(store_err)
    }

    async fn list_for_application(&self, application_id: DbId) -> CoreResult<Vec<WorkflowEvent>> {
        WorkflowEventRepo::list_for_application(&self.pool, application_id)
            .await
            .map_err(store_err)
    }
}

impl ActorDirectory for PgStore {
    async fn display_name(&self, actor_id: DbId) -> CoreResult<String> {
        Ok(EmployeeRepo::display_name(&self.pool, actor_id)
            .await
            .map_err(store_err)?
            .unwrap_or_else(|| UNKNOWN_USER.to_string()))
    }
}

impl ProductCatalog for PgStore {
    async fn get_product(&self, id: DbId) -> CoreResult<LoanProduct> {
        LoanProductRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_err)?
            .ok_or(CoreError::NotFound {
                entity: "LoanProduct",
                id,
            })
    }
}
