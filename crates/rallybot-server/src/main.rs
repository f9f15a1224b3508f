//! # rallybot-server
//!
//! HTTP adapter for rallybot.
//!
//! A chat gateway relays every guild message to `POST /command`; the server
//! answers with the single reply to post back, or `null` when the message
//! was not addressed to the bot.
//!
//! On start it opens the SQLite store, seeds the rally catalog when empty and
//! loads it once into memory.

mod api;
mod config;
mod error;
mod rate_limit;

use std::sync::{Arc, Mutex};

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rallybot_core::RallyBot;
use rallybot_store::{CatalogSeed, Database};

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::rate_limit::RateLimiter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,rallybot_server=debug,rallybot_core=debug")
        }))
        .init();

    info!("Starting rallybot server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open the store and load the catalog
    // -----------------------------------------------------------------------
    let mut db = match &config.database_path {
        Some(path) => Database::open_at(path)
            .with_context(|| format!("opening database at {}", path.display()))?,
        None => Database::new().context("opening database in the data directory")?,
    };
    info!(path = ?db.path(), "Database ready");

    if config.catalog_seed_path.exists() {
        let seed = CatalogSeed::from_path(&config.catalog_seed_path).with_context(|| {
            format!("reading catalog seed {}", config.catalog_seed_path.display())
        })?;
        db.seed_catalog(&seed)?;
    } else {
        warn!(
            path = %config.catalog_seed_path.display(),
            "Catalog seed not found, using the catalog already in the database"
        );
    }

    let catalog = Arc::new(db.load_catalog()?);
    if catalog.is_empty() {
        warn!("Catalog is empty; record commands will not resolve");
    }
    info!(
        locales = catalog.locales().len(),
        stages = catalog.stages().len(),
        vehicle_classes = catalog.vehicle_classes().len(),
        rallies = catalog.rallies().len(),
        "Catalog loaded"
    );

    let bot = Arc::new(RallyBot::new(catalog, Mutex::new(db), config.bot_settings()));

    let rate_limiter = RateLimiter::new(config.quota());

    let http_addr = config.http_addr;
    let app_state = AppState {
        bot,
        rate_limiter: rate_limiter.clone(),
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Spawn background tasks
    // -----------------------------------------------------------------------

    // Forget throttled users every 5 minutes once they have been idle for 10
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.purge_idle(std::time::Duration::from_secs(600)).await;
        }
    });

    // -----------------------------------------------------------------------
    // 5. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
