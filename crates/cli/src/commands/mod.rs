//! `si-cli` subcommands.
//!
//! Every command except `migrate` builds the same [`AppState`] the server
//! uses, so settings such as the scraper timeout and Shopify API version are
//! read from the same environment variables.

pub mod competitor;
pub mod insights;
pub mod migrate;
pub mod store;
pub mod sync;

use serde::Serialize;
use thiserror::Error;

use shop_insights_server::config::{AppConfig, ConfigError};
use shop_insights_server::db::{self, RepositoryError};
use shop_insights_server::services::{InsightsError, SyncError};
use shop_insights_server::shopify::ShopifyError;
use shop_insights_server::state::AppState;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Insights(#[from] InsightsError),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}

/// Load configuration and connect to the database.
pub async fn connect() -> Result<AppState, CommandError> {
    let config = AppConfig::from_env()?;
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;
    Ok(AppState::new(config, pool)?)
}

/// Write a value to stdout as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    let rendered = serde_json::to_string_pretty(value)?;
    #[allow(clippy::print_stdout)]
    {
        println!("{rendered}");
    }
    Ok(())
}
