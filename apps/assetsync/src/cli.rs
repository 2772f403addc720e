//! Command-line arguments.

use clap::Parser;

use crate::scheduler::{parse_cron, Scheduler};

/// Sync Meraki devices into Snipe-IT on a schedule
#[derive(Debug, Parser)]
#[command(name = "assetsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Minutes between scheduled runs
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Cron expression for the schedule, e.g. "0 * * * *" for hourly
    #[arg(long, conflicts_with = "interval", value_parser = parse_cron)]
    pub cron: Option<cron::Schedule>,

    /// Run a single sync and exit
    #[arg(long)]
    pub run_once: bool,

    /// Print run summaries as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// The schedule for repeated runs: the cron expression if given,
    /// otherwise the interval.
    #[must_use]
    pub fn scheduler(&self) -> Scheduler {
        match &self.cron {
            Some(schedule) => Scheduler::cron(schedule.clone()),
            None => Scheduler::every_minutes(self.interval),
        }
    }
}
