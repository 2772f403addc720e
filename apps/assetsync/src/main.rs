//! assetsync - keep a Snipe-IT asset register in step with Meraki
//!
//! Runs once with `--run-once`, otherwise every `--interval` minutes (or on
//! a `--cron` schedule) until interrupted.

use clap::Parser;

use assetsync::app::{build_engine, run_once, run_scheduled};
use assetsync::cli::Cli;
use assetsync::config::AppConfig;
use assetsync::logging::init_logging;
use assetsync::{AppError, AppResult};

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(AppError::from(e).exit_code());
    });

    init_logging(&config.log_level, config.log_format);

    match run(cli, config).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            tracing::error!(error = %e, "assetsync failed");
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli, config: AppConfig) -> AppResult<()> {
    tracing::info!(
        organization_id = %config.meraki_organization_id,
        snipe_it_url = %config.snipe_it_url,
        run_once = cli.run_once,
        "Starting assetsync"
    );

    let engine = build_engine(&config)?;

    if cli.run_once {
        run_once(&engine, cli.json).await?;
    } else {
        run_scheduled(&engine, cli.scheduler(), cli.json).await;
    }
    Ok(())
}
