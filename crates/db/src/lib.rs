//! PostgreSQL persistence for loanflow: row models and repositories.
//!
//! Repositories are stateless unit structs operating on a shared [`DbPool`];
//! all queries are runtime-checked `query_as` calls against the schema in
//! `db/migrations`.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Create a connection pool from the `DATABASE_URL` environment variable,
/// loading `.env` if present.
pub async fn connect_from_env() -> Result<DbPool, sqlx::Error> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL")
        .map_err(|_| sqlx::Error::Configuration("DATABASE_URL is not set".into()))?;
    create_pool(&url).await
}

/// Verify the database connection is usable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
