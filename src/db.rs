//! # db — PostgreSQL connection layer
//!
//! Uses `sqlx` for async PostgreSQL.  Queries are checked at runtime, so the
//! crate builds without a live database.
//!
//! ## Setup
//! 1. Create the database and a user for it
//! 2. Set `DATABASE_URL` in `.env`
//! 3. Start the dashboard or CLI — `migrations/001_init.sql` is applied on
//!    connect and is safe to re-run

use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

// ─── Pool Init ────────────────────────────────────────────────────────────────

/// Builds the `PgPool` and applies the embedded migration.
pub async fn init_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    run_migrations(&pool).await?;

    info!("✅ PostgreSQL connected and migrations applied");
    Ok(pool)
}

async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    // Several statements, so it goes through the simple query protocol
    sqlx::raw_sql(include_str!("../migrations/001_init.sql"))
        .execute(pool)
        .await
        .context("Failed to run migration 001_init.sql")?;

    Ok(())
}
