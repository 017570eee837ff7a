//! seller-sync command line interface

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use seller_sync::cnpj::Cnpj;
use seller_sync::config::{Config, LoggingConfig};
use seller_sync::error::BulkSyncError;
use seller_sync::models::NewSeller;
use seller_sync::provider::{BrasilApiProvider, ReceitaWsProvider};
use seller_sync::resolver::LookupResolver;
use seller_sync::store::{SellerStore, SqliteSellerStore};
use seller_sync::sync::{BulkSynchronizer, RateLimiter, SyncMode};

#[derive(Parser)]
#[command(name = "seller-sync", version)]
#[command(about = "CNPJ resolution and bulk seller data synchronization")]
struct Cli {
    /// Path to the YAML configuration file
    ///
    /// Without a file, configuration comes from SELLER_SYNC_* environment
    /// variables on top of the defaults.
    #[arg(short, long, env = "SELLER_SYNC_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Synchronize every stored seller
    SyncAll,

    /// Synchronize only sellers whose address is still pending
    SyncRemaining,

    /// Resolve one CNPJ and print the company record
    Lookup {
        /// The identifier, formatted or bare digits
        cnpj: String,
    },

    /// Register a new seller
    Add {
        /// The seller's CNPJ, formatted or bare digits
        cnpj: String,

        /// Contact email
        email: String,

        /// Contact phone
        #[arg(long)]
        phone: Option<String>,
    },
}

fn init_logging(logging: &LoggingConfig) {
    // RUST_LOG wins over the configured level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_resolver(config: &Config) -> anyhow::Result<Arc<LookupResolver>> {
    // The limiter only governs the primary's quota; the fallback is an
    // unauthenticated public API without one.
    let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
    let primary = Arc::new(
        ReceitaWsProvider::new(&config.providers.receita_ws, limiter)
            .context("Failed to build ReceitaWS client")?,
    );
    let fallback = Arc::new(
        BrasilApiProvider::new(&config.providers.brasil_api)
            .context("Failed to build BrasilAPI client")?,
    );
    Ok(Arc::new(LookupResolver::new(primary, fallback)))
}

async fn run_sync(config: &Config, mode: SyncMode) -> anyhow::Result<()> {
    let store = Arc::new(
        SqliteSellerStore::new(&config.database.path)
            .await
            .with_context(|| format!("Failed to open database at {}", config.database.path))?,
    );
    let resolver = build_resolver(config)?;
    let synchronizer = BulkSynchronizer::new(store, resolver, config.sync.clone());

    match synchronizer.run(mode).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(BulkSyncError::Unauthorized { report }) => {
            // Print the partial report before failing; written updates stand
            println!("{}", serde_json::to_string_pretty(&report)?);
            anyhow::bail!(
                "Upstream credentials rejected; run aborted after {} of {} sellers",
                report.processed(),
                report.total
            )
        }
        Err(err) => Err(err.into()),
    }
}

async fn run_lookup(config: &Config, raw: &str) -> anyhow::Result<()> {
    let cnpj = Cnpj::parse(raw).with_context(|| format!("Invalid CNPJ: {}", raw))?;
    let resolver = build_resolver(config)?;
    let record = resolver.resolve(&cnpj).await?;

    let output = serde_json::json!({
        "cnpj": cnpj.formatted(),
        "company": record,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_add(
    config: &Config,
    raw: &str,
    email: String,
    phone: Option<String>,
) -> anyhow::Result<()> {
    let cnpj = Cnpj::parse(raw).with_context(|| format!("Invalid CNPJ: {}", raw))?;
    let store = SqliteSellerStore::new(&config.database.path)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.path))?;

    let seller = store
        .insert(NewSeller {
            cnpj: cnpj.digits().to_string(),
            email,
            phone,
        })
        .await
        .context("Failed to register seller")?;

    info!(id = seller.id, cnpj = %seller.cnpj, "Seller registered");
    println!("{}", serde_json::to_string_pretty(&seller)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            Config::from_file(path).with_context(|| format!("Failed to load config {}", path))?
        }
        None => Config::from_env().context("Failed to load config from environment")?,
    };

    init_logging(&config.logging);

    match cli.command {
        Command::SyncAll => run_sync(&config, SyncMode::Full).await,
        Command::SyncRemaining => run_sync(&config, SyncMode::Remaining).await,
        Command::Lookup { cnpj } => run_lookup(&config, &cnpj).await,
        Command::Add { cnpj, email, phone } => run_add(&config, &cnpj, email, phone).await,
    }
}
