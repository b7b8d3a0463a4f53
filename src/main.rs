//! Threat-news radar — binary entrypoint.
//! One batch run: fetch the feed registry, classify, dedupe, write the
//! digest, exit. Scheduling lives outside (cron or a systemd timer).

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use oilgas_threat_radar::config::RadarConfig;
use oilgas_threat_radar::fetch::{self, HttpTransport};
use oilgas_threat_radar::store;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = RadarConfig::load_default()?;
    let transport = Arc::new(HttpTransport::new()?);
    let digest = fetch::run_once(transport, &config).await;

    // Fetch failures were already reported per source; the run still
    // produces a digest. Only a write failure makes the process exit
    // non-zero.
    let paths = store::output_paths();
    store::write_digest(&digest, &paths)?;

    let destinations = paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    info!(
        items = digest.items.len(),
        feeds = digest.sources.len(),
        destinations = %destinations,
        "digest written"
    );
    Ok(())
}
