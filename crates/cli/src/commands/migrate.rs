//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! si-cli migrate
//! ```
//!
//! Migrations live in `crates/server/migrations/` and are embedded in the
//! server library, so this binary needs no access to the source tree.

use secrecy::ExposeSecret;
use sqlx::PgPool;

use shop_insights_server::config::database_url_from_env;
use shop_insights_server::db;

use super::CommandError;

/// Apply every pending migration.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
