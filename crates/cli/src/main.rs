//! Shop Insights CLI - migrations, syncs and brand insight tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! si-cli migrate
//!
//! # Register a store (verifies the token against Shopify first)
//! si-cli store add --shop acme.myshopify.com --token shpat_...
//! si-cli store list
//!
//! # Sync a store by ID or domain
//! si-cli sync acme.myshopify.com --resources products,orders
//!
//! # Scrape a public storefront
//! si-cli insights fetch https://acme.com
//!
//! # Link brand 2 as a competitor of brand 1
//! si-cli competitor add 1 2
//! ```
//!
//! # Environment Variables
//!
//! - `INSIGHTS_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `SHOPIFY_API_VERSION`, `SCRAPER_*` - same settings as the server

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use shop_insights_core::{BrandId, SyncResource};

mod commands;

#[derive(Parser)]
#[command(name = "si-cli")]
#[command(author, version, about = "Shop Insights CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Manage registered stores
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
    /// Sync a store from the Shopify Admin API
    Sync {
        /// Store ID or shop domain
        store: String,

        /// Resources to sync (defaults to all)
        #[arg(short, long, value_delimiter = ',')]
        resources: Vec<SyncResource>,
    },
    /// Public storefront insights
    Insights {
        #[command(subcommand)]
        action: InsightsAction,
    },
    /// Manage competitor links between brands
    Competitor {
        #[command(subcommand)]
        action: CompetitorAction,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Register a store
    Add {
        /// Shop domain, e.g. `acme.myshopify.com`
        #[arg(long = "shop")]
        shop_domain: String,

        /// Admin API access token
        #[arg(short, long)]
        token: String,

        /// Admin API version (defaults to `SHOPIFY_API_VERSION`)
        #[arg(long)]
        api_version: Option<String>,
    },
    /// List registered stores
    List,
}

#[derive(Subcommand)]
enum InsightsAction {
    /// Scrape a storefront and store its brand context
    Fetch {
        /// Website URL, e.g. `https://acme.com`
        url: String,
    },
}

#[derive(Subcommand)]
enum CompetitorAction {
    /// Link a competitor to a brand
    Add { brand: BrandId, competitor: BrandId },
    /// Remove a competitor link
    Remove { brand: BrandId, competitor: BrandId },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Store { action } => match action {
            StoreAction::Add {
                shop_domain,
                token,
                api_version,
            } => commands::store::add(&shop_domain, &token, api_version).await?,
            StoreAction::List => commands::store::list().await?,
        },
        Commands::Sync { store, resources } => commands::sync::run(&store, &resources).await?,
        Commands::Insights { action } => match action {
            InsightsAction::Fetch { url } => commands::insights::fetch(&url).await?,
        },
        Commands::Competitor { action } => match action {
            CompetitorAction::Add { brand, competitor } => {
                commands::competitor::add(brand, competitor).await?;
            }
            CompetitorAction::Remove { brand, competitor } => {
                commands::competitor::remove(brand, competitor).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sync_resources_are_comma_separated() {
        let cli = Cli::try_parse_from(["si-cli", "sync", "7", "--resources", "orders,products"])
            .unwrap_or_else(|e| panic!("{e}"));
        let Commands::Sync { store, resources } = cli.command else {
            panic!("expected sync command");
        };
        assert_eq!(store, "7");
        assert_eq!(resources, vec![SyncResource::Orders, SyncResource::Products]);
    }

    #[test]
    fn test_store_add_takes_shop_and_token_flags() {
        let cli = Cli::try_parse_from([
            "si-cli",
            "store",
            "add",
            "--shop",
            "acme.myshopify.com",
            "--token",
            "shpat_abc",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        let Commands::Store {
            action:
                StoreAction::Add {
                    shop_domain,
                    token,
                    api_version,
                },
        } = cli.command
        else {
            panic!("expected store add command");
        };
        assert_eq!(shop_domain, "acme.myshopify.com");
        assert_eq!(token, "shpat_abc");
        assert!(api_version.is_none());
    }

    #[test]
    fn test_unknown_resource_is_rejected() {
        assert!(Cli::try_parse_from(["si-cli", "sync", "7", "-r", "invoices"]).is_err());
    }

    #[test]
    fn test_competitor_ids_must_be_numeric() {
        assert!(Cli::try_parse_from(["si-cli", "competitor", "add", "1", "acme"]).is_err());
    }
}
