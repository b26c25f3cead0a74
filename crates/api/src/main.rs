//! launderd - recycles expired calendar events on a schedule

use anyhow::Context;
use chrono::Utc;
use launder_app::AppContext;
use launder_infra::{config, init_tracing};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let config = config::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => debug!(error = %err, "no .env file loaded"),
    }

    let ctx = AppContext::new_with_config(config)
        .await
        .context("failed to initialise application context")?;

    let schedule = ctx.start_scheduler().await.context("failed to start laundry scheduler")?;
    info!(
        recurrence = %schedule.recurrence,
        next_run = %schedule.next_run_after(Utc::now()),
        "launderd running"
    );

    if ctx.config.scheduler.run_on_start {
        match ctx.run_laundry_now().await {
            Ok(report) => info!(
                scanned = report.scanned,
                laundered = report.laundered.len(),
                skipped = report.skipped.len(),
                "startup laundry pass finished"
            ),
            Err(err) => error!(error = %err, "startup laundry pass failed"),
        }
    }

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    info!("shutdown requested");

    ctx.shutdown().await.context("failed to stop cleanly")?;
    Ok(())
}
