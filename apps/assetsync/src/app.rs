//! Wiring of the concrete Meraki and Snipe-IT collaborators into the engine.

use assetsync_core::{SyncEngine, SyncReport};
use assetsync_meraki::MerakiClient;
use assetsync_snipeit::SnipeItClient;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::scheduler::Scheduler;

pub type MerakiSnipeItEngine = SyncEngine<MerakiClient, SnipeItClient>;

/// Build the engine from loaded configuration.
pub fn build_engine(config: &AppConfig) -> AppResult<MerakiSnipeItEngine> {
    let meraki = MerakiClient::new(config.meraki())?;
    let snipe_it = SnipeItClient::new(config.snipe_it())?;
    Ok(SyncEngine::new(meraki, snipe_it, config.sync_settings()))
}

/// Render a run summary for stdout.
#[must_use]
pub fn render_report(report: &SyncReport, json: bool) -> String {
    if json {
        serde_json::to_string_pretty(report).unwrap_or_else(|e| {
            format!("{{\"error\": \"failed to serialize report: {e}\"}}")
        })
    } else {
        report.to_string()
    }
}

/// Execute a single run and print its summary.
pub async fn run_once(engine: &MerakiSnipeItEngine, json: bool) -> AppResult<SyncReport> {
    let report = engine.run().await?;
    println!("{}", render_report(&report, json));
    Ok(report)
}

/// Run on `scheduler` until Ctrl-C. Aborted runs are logged and the
/// schedule continues.
pub async fn run_scheduled(engine: &MerakiSnipeItEngine, scheduler: Scheduler, json: bool) {
    info!(schedule = %scheduler, "Scheduler started, waiting for the first run");

    scheduler
        .run(
            move || async move {
                if let Err(e) = run_once(engine, json).await {
                    error!(error = %e, "Scheduled sync run failed");
                }
            },
            shutdown_signal(),
        )
        .await;
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, stopping after the current run"),
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
