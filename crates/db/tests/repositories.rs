//! Repository tests against a live Postgres database.
//!
//! These run only when `DATABASE_URL` is set; without it every test is a
//! silent pass. Migrations are applied on first connection, and seeded rows
//! use unique emails/codes so reruns against the same database do not
//! collide.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;

use loanflow_core::status::ApplicationStatus;
use loanflow_core::types::DbId;
use loanflow_db::models::{CreateLoanProduct, NewLoanApplication, StatusUpdate};
use loanflow_db::repositories::{LoanApplicationRepo, LoanProductRepo};
use loanflow_db::DbPool;

async fn test_pool() -> Option<DbPool> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = loanflow_db::create_pool(&url)
        .await
        .expect("connecting to DATABASE_URL");
    sqlx::migrate!("../../db/migrations")
        .run(&pool)
        .await
        .expect("applying migrations");
    Some(pool)
}

fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{nanos}")
}

async fn seed_employee(pool: &DbPool) -> DbId {
    sqlx::query_scalar::<_, DbId>(
        "INSERT INTO employees (name, email, role, employee_code)
         VALUES ($1, $2, 'EMPLOYEE', $3)
         RETURNING id",
    )
    .bind("Asha Rao")
    .bind(format!("{}@example.com", unique("asha")))
    .bind(unique("EMP"))
    .fetch_one(pool)
    .await
    .expect("seeding employee")
}

async fn seed_product(pool: &DbPool) -> DbId {
    LoanProductRepo::create(
        pool,
        &CreateLoanProduct {
            name: unique("Personal Loan"),
            description: None,
            max_amount: 500_000,
            interest_rate: 12.0,
            max_tenure_months: 60,
            eligibility: None,
        },
    )
    .await
    .expect("seeding product")
    .id
}

async fn seed_application(pool: &DbPool, product_id: DbId, applicant_id: DbId) -> DbId {
    LoanApplicationRepo::create(
        pool,
        &NewLoanApplication {
            loan_product_id: product_id,
            applicant_id,
            applied_amount: 100_000,
            applied_tenure_months: 12,
            emi: 8_885,
        },
    )
    .await
    .expect("creating application")
    .id
}

#[tokio::test]
async fn test_compare_and_swap_applies_exactly_once() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let applicant_id = seed_employee(&pool).await;
    let product_id = seed_product(&pool).await;
    let application_id = seed_application(&pool, product_id, applicant_id).await;

    let mut update = StatusUpdate::to_status(ApplicationStatus::ManagerApproved);
    update.manager_comment = Some("Verified payslips".to_string());
    update.approved_at = Some(Utc::now());

    let won = LoanApplicationRepo::compare_and_swap_status(
        &pool,
        application_id,
        ApplicationStatus::Pending,
        &update,
    )
    .await
    .unwrap()
    .expect("first writer should win");
    assert_eq!(won.status, ApplicationStatus::ManagerApproved);
    assert_eq!(won.manager_comment.as_deref(), Some("Verified payslips"));
    assert!(won.approved_at.is_some());

    // A second writer still holding the PENDING snapshot updates zero rows.
    let lost = LoanApplicationRepo::compare_and_swap_status(
        &pool,
        application_id,
        ApplicationStatus::Pending,
        &StatusUpdate::to_status(ApplicationStatus::ManagerRejected),
    )
    .await
    .unwrap();
    assert!(lost.is_none());

    let reloaded = LoanApplicationRepo::find_by_id(&pool, application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, ApplicationStatus::ManagerApproved);
}

#[tokio::test]
async fn test_compare_and_swap_leaves_unset_fields_untouched() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let applicant_id = seed_employee(&pool).await;
    let product_id = seed_product(&pool).await;
    let application_id = seed_application(&pool, product_id, applicant_id).await;

    let mut approve = StatusUpdate::to_status(ApplicationStatus::ManagerApproved);
    approve.manager_comment = Some("Within policy".to_string());
    approve.approved_at = Some(Utc::now());
    LoanApplicationRepo::compare_and_swap_status(
        &pool,
        application_id,
        ApplicationStatus::Pending,
        &approve,
    )
    .await
    .unwrap()
    .unwrap();

    // The finance step writes its own fields only; the manager comment and
    // approval instant survive.
    let mut finance = StatusUpdate::to_status(ApplicationStatus::FinanceApproved);
    finance.finance_comment = Some("Funds allocated".to_string());
    finance.approved_at = Some(Utc::now());
    let updated = LoanApplicationRepo::compare_and_swap_status(
        &pool,
        application_id,
        ApplicationStatus::ManagerApproved,
        &finance,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.manager_comment.as_deref(), Some("Within policy"));
    assert_eq!(updated.finance_comment.as_deref(), Some("Funds allocated"));
}

#[tokio::test]
async fn test_product_update_replaces_terms() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let product_id = seed_product(&pool).await;

    let updated = LoanProductRepo::update(
        &pool,
        product_id,
        &CreateLoanProduct {
            name: unique("Personal Loan Plus"),
            description: Some("Raised limits".to_string()),
            max_amount: 750_000,
            interest_rate: 11.5,
            max_tenure_months: 72,
            eligibility: None,
        },
    )
    .await
    .unwrap()
    .expect("product exists");
    assert_eq!(updated.max_amount, 750_000);
    assert_eq!(updated.max_tenure_months, 72);
    assert_eq!(updated.description.as_deref(), Some("Raised limits"));
}

#[tokio::test]
async fn test_referenced_products_are_retired_not_deleted() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let applicant_id = seed_employee(&pool).await;
    let product_id = seed_product(&pool).await;
    assert!(!LoanProductRepo::has_applications(&pool, product_id)
        .await
        .unwrap());

    seed_application(&pool, product_id, applicant_id).await;
    assert!(LoanProductRepo::has_applications(&pool, product_id)
        .await
        .unwrap());

    let retired = LoanProductRepo::set_active(&pool, product_id, false)
        .await
        .unwrap()
        .unwrap();
    assert!(!retired.is_active);
    let reloaded = LoanProductRepo::find_by_id(&pool, product_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!reloaded.is_active);
}
