//! Trading replay dashboard
//!
//! Loads the record dataset, groups it by day and serves the animated chart.
//! Run with: cargo run
//!
//! Then open http://localhost:3000 in your browser.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tradereplay::config::Config;
use tradereplay::data::RecordLoader;
use tradereplay::replay::{group_by_day, ReplayDriver};
use tradereplay::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tradereplay=info".parse()?),
        )
        .init();

    info!("Starting trading replay dashboard");

    let config = Config::load()?;
    let tz = config.replay.tz()?;

    let records = RecordLoader::new(&config.data.path)
        .strict(config.data.strict)
        .load()?;

    let buckets = group_by_day(&records, tz);
    info!(
        "Grouped {} records into {} days ({})",
        records.len(),
        buckets.len(),
        config.replay.timezone
    );

    let driver = ReplayDriver::new(buckets, tz, config.replay.tick_interval());

    // Start on the first day, like the day selector's default
    match driver.days().first_day() {
        Some(day) => {
            driver.select_day(day).await?;
        }
        None => warn!("No records to replay in {}", config.data.path),
    }

    let state = Arc::new(AppState::new(driver, config.chart.clone()));
    let app = server::router(state);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Dashboard running at http://localhost:{}", config.server.port);
    axum::serve(listener, app).await?;

    Ok(())
}
