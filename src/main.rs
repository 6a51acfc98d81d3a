use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

mod config;
mod dashboard;
mod db;
mod error;
mod rating;
mod stats;

use config::Config;
use dashboard::AppState;
use db::{import, Database, TableCache};
use stats::teams::logo_path;
use stats::{NbaStats, StatsProvider, TeamRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;
    let as_of = config.as_of_date()?;
    if let Some(date) = as_of {
        info!("Season pinned by AS_OF={}", date);
    }

    let registry = Arc::new(TeamRegistry::nba());

    // Open database
    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    if let Some(csv_path) = &config.import_csv {
        let rows = import::load_daily_csv(Path::new(csv_path), &registry)
            .with_context(|| format!("Failed to import {}", csv_path))?;
        let written = db.upsert_ratings(&rows)?;
        info!("Imported {} daily ratings from {}", written, csv_path);
    }

    match db.date_bounds()? {
        Some(bounds) => info!(
            "Historical ratings: {} rows from {} to {}",
            db.count_ratings()?,
            bounds.min,
            bounds.max
        ),
        None => warn!("Historical ratings table is empty; only live windows will render"),
    }

    report_missing_logos(Path::new(&config.logos_dir), &registry);

    let provider: Arc<dyn StatsProvider> = Arc::new(NbaStats::new(
        Some(config.stats_api_url.as_str()),
        config.request_timeout(),
    )?);
    info!(
        "Stats provider: {} ({}, timeout {:?}, {:?})",
        provider.name(),
        config.stats_api_url,
        config.request_timeout(),
        config.season_type
    );

    let state = AppState {
        tables: Arc::new(TableCache::new(db)),
        provider,
        registry,
        season_type: config.season_type,
        request_timeout: config.request_timeout(),
        as_of,
    };
    let app = dashboard::router(state, PathBuf::from(&config.logos_dir));
    let addr: SocketAddr = config.dashboard_addr.parse()?;
    info!("Dashboard listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run dashboard server (blocks until shutdown)
    axum::serve(listener, app).await?;

    Ok(())
}

/// Warn about teams without a `<team>.png` in the logo folder; the chart
/// falls back to a dot and label for them.
fn report_missing_logos(dir: &Path, registry: &TeamRegistry) {
    if !dir.is_dir() {
        warn!("Logo folder {} not found; teams will render as dots", dir.display());
        return;
    }
    let missing: Vec<&str> = registry
        .names()
        .iter()
        .filter(|team| !logo_path(dir, team).is_file())
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        warn!("{} team logo(s) missing in {}: {:?}", missing.len(), dir.display(), missing);
    }
}
