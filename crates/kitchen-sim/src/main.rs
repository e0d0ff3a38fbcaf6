//! # Kitchen Simulator Entry Point
//!
//! Usage: `kitchen-sim [settings.json]`
//!
//! Loads settings (defaults when the file is absent), replays the
//! configured orders file through the engine, and logs every event plus
//! a final summary. The process exits once every ingested order has
//! been delivered or discarded and all workers have terminated.

use std::path::PathBuf;
use std::sync::Arc;

use kitchen_sim::feed::JsonOrderFeed;
use kitchen_sim::render::ConsoleSink;
use kitchen_sim::settings::SimSettings;
use kitchen_sim::telemetry::setup_tracing;
use shelf_engine::Kitchen;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = SimSettings::load(settings_path.as_deref())?;
    info!(orders_file = %settings.orders_file.display(), "starting kitchen simulation");

    let feed = JsonOrderFeed::from_path(&settings.orders_file)?;
    let kitchen = Kitchen::new(settings.kitchen, Arc::new(ConsoleSink::new()))?;

    match kitchen.run(feed).await {
        Ok(summary) => {
            info!(
                ingested = summary.ingested,
                delivered = summary.delivered,
                discarded_stale = summary.discarded_stale,
                discarded_shelf_full = summary.discarded_shelf_full,
                "simulation complete"
            );
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "simulation failed");
            Err(err.into())
        }
    }
}
