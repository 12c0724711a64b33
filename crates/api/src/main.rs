//! Triage Server - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_logging(&settings.log).context("initializing logging")?;

    info!("=== Triage Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Escalation threshold: {}", settings.queue.escalation_threshold);

    run_server(settings).await
}
