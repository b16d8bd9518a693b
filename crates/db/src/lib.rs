//! PostgreSQL storage for notices.
//!
//! - [`models`]: row structs for `notices` and `user_notices`.
//! - [`repositories`]: query functions over a [`DbPool`].
//! - [`PgNoticeGateway`]: the dispatch core's persistence gateway.

pub mod gateway;
pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;

pub use gateway::PgNoticeGateway;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
