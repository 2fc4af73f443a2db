//! In-memory store implementation.
//!
//! Backs the integration tests with the same compare-and-swap semantics as
//! the Postgres store: all tables live behind one mutex, and the CAS check
//! and write happen under a single lock acquisition.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use loanflow_core::error::{CoreError, CoreResult};
use loanflow_core::status::ApplicationStatus;
use loanflow_core::types::DbId;
use loanflow_db::models::{
    CreateLoanProduct, LoanApplication, LoanProduct, NewLoanApplication, NewWorkflowEvent,
    StatusUpdate, WorkflowEvent,
};

use super::{ActorDirectory, ApplicationStore, EventStore, ProductCatalog, UNKNOWN_USER};

#[derive(Default)]
struct Inner {
    products: HashMap<DbId, LoanProduct>,
    applications: HashMap<DbId, LoanApplication>,
    events: Vec<WorkflowEvent>,
    employees: HashMap<DbId, String>,
    next_id: DbId,
}

impl Inner {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of every store seam.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_event_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("MemoryStore mutex poisoned")
    }

    /// Seed an active loan product.
    pub fn seed_product(&self, input: CreateLoanProduct) -> LoanProduct {
        let mut inner = self.locked();
        let now = Utc::now();
        let product = LoanProduct {
            id: inner.next_id(),
            name: input.name,
            description: input.description,
            max_amount: input.max_amount,
            interest_rate: input.interest_rate,
            max_tenure_months: input.max_tenure_months,
            eligibility: input.eligibility,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.products.insert(product.id, product.clone());
        product
    }

    /// Open or close a seeded product for applications.
    pub fn set_product_active(&self, id: DbId, is_active: bool) {
        let mut inner = self.locked();
        if let Some(product) = inner.products.get_mut(&id) {
            product.is_active = is_active;
            product.updated_at = Utc::now();
        }
    }

    /// Seed a directory entry, returning the new actor id.
    pub fn seed_employee(&self, name: &str) -> DbId {
        let mut inner = self.locked();
        let id = inner.next_id();
        inner.employees.insert(id, name.to_string());
        id
    }

    /// Drop an application's event log, simulating an application whose
    /// authoritative history was never recorded.
    pub fn purge_events(&self, application_id: DbId) {
        self.locked()
            .events
            .retain(|e| e.application_id != application_id);
    }

    /// Make subsequent event-log reads fail, simulating an unavailable
    /// event store.
    pub fn fail_event_reads(&self, fail: bool) {
        self.fail_event_reads.store(fail, Ordering::SeqCst);
    }
}

impl ApplicationStore for MemoryStore {
    async fn get(&self, id: DbId) -> CoreResult<LoanApplication> {
        self.locked()
            .applications
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "LoanApplication",
                id,
            })
    }

    async fn insert(&self, input: NewLoanApplication) -> CoreResult<LoanApplication> {
        let mut inner = self.locked();
        let application = LoanApplication {
            id: inner.next_id(),
            loan_product_id: input.loan_product_id,
            applicant_id: input.applicant_id,
            applied_amount: input.applied_amount,
            applied_tenure_months: input.applied_tenure_months,
            emi: input.emi,
            status: ApplicationStatus::Pending,
            manager_comment: None,
            finance_comment: None,
            applied_at: Utc::now(),
            approved_at: None,
            rejected_at: None,
            completed_at: None,
        };
        inner
            .applications
            .insert(application.id, application.clone());
        Ok(application)
    }

    async fn compare_and_swap(
        &self,
        id: DbId,
        expected: ApplicationStatus,
        update: StatusUpdate,
    ) -> CoreResult<LoanApplication> {
        let mut inner = self.locked();
        let application = inner
            .applications
            .get_mut(&id)
            .ok_or(CoreError::NotFound {
                entity: "LoanApplication",
                id,
            })?;
        if application.status != expected {
            return Err(CoreError::ConcurrentModification { application_id: id });
        }
        application.status = update.status;
        if update.manager_comment.is_some() {
            application.manager_comment = update.manager_comment;
        }
        if update.finance_comment.is_some() {
            application.finance_comment = update.finance_comment;
        }
        if update.approved_at.is_some() {
            application.approved_at = update.approved_at;
        }
        if update.rejected_at.is_some() {
            application.rejected_at = update.rejected_at;
        }
        if update.completed_at.is_some() {
            application.completed_at = update.completed_at;
        }
        Ok(application.clone())
    }

    async fn list_for_applicant(&self, applicant_id: DbId) -> CoreResult<Vec<LoanApplication>> {
        let inner = self.locked();
        let mut applications: Vec<_> = inner
            .applications
            .values()
            .filter(|a| a.applicant_id == applicant_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(applications)
    }

    async fn list_by_status(&self, status: ApplicationStatus) -> CoreResult<Vec<LoanApplication>> {
        let inner = self.locked();
        let mut applications: Vec<_> = inner
            .applications
            .values()
            .filter(|a| a.status == status)
            .cloned()
            .collect();
        applications.sort_by(|a, b| a.applied_at.cmp(&b.applied_at));
        Ok(applications)
    }
}

impl EventStore for MemoryStore {
    async fn append(&self, event: NewWorkflowEvent) -> CoreResult<WorkflowEvent> {
        let mut inner = self.locked();
        let stored = WorkflowEvent {
            id: inner.next_id(),
            application_id: event.application_id,
            status_from: event.status_from,
            status_to: event.status_to,
            comment: event.comment,
            actor_id: event.actor_id,
            occurred_at: Utc::now(),
        };
        inner.events.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_application(&self, application_id: DbId) -> CoreResult<Vec<WorkflowEvent>> {
        if self.fail_event_reads.load(Ordering::SeqCst) {
            return Err(CoreError::Store("event store unavailable".to_string()));
        }
        let inner = self.locked();
        // Events are appended in occurrence order, so filtering preserves
        // the ascending ordering the contract requires.
        Ok(inner
            .events
            .iter()
            .filter(|e| e.application_id == application_id)
            .cloned()
            .collect())
    }
}

impl ActorDirectory for MemoryStore {
    async fn display_name(&self, actor_id: DbId) -> CoreResult<String> {
        Ok(self
            .locked()
            .employees
            .get(&actor_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_USER.to_string()))
    }
}

impl ProductCatalog for MemoryStore {
    async fn get_product(&self, id: DbId) -> CoreResult<LoanProduct> {
        self.locked()
            .products
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "LoanProduct",
                id,
            })
    }
}
