//! Job scheduler: fixed interval or cron expression.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// When scheduled runs fire.
#[derive(Debug, Clone)]
pub enum Trigger {
    Every(Duration),
    Cron(Box<cron::Schedule>),
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Every(period) => write!(f, "every {}s", period.as_secs()),
            Self::Cron(schedule) => write!(f, "cron '{schedule}'"),
        }
    }
}

/// Runs a job on a [`Trigger`], one run at a time.
///
/// With an interval the first run happens one period after [`Scheduler::run`]
/// is called. A run that outlasts the period delays the next one instead of
/// stacking up. With a cron expression, fire times that pass while a run is in
/// flight are skipped.
#[derive(Debug, Clone)]
pub struct Scheduler {
    trigger: Trigger,
}

impl Scheduler {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            trigger: Trigger::Every(period),
        }
    }

    #[must_use]
    pub fn every_minutes(minutes: u64) -> Self {
        Self::new(Duration::from_secs(minutes.max(1) * 60))
    }

    #[must_use]
    pub fn cron(schedule: cron::Schedule) -> Self {
        Self {
            trigger: Trigger::Cron(Box::new(schedule)),
        }
    }

    #[must_use]
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// The interval period, if this is an interval schedule.
    #[must_use]
    pub fn period(&self) -> Option<Duration> {
        match &self.trigger {
            Trigger::Every(period) => Some(*period),
            Trigger::Cron(_) => None,
        }
    }

    /// Drive `job` until `shutdown` resolves. Returns the number of runs.
    ///
    /// Shutdown is only observed between runs, so an in-flight run always
    /// completes.
    pub async fn run<F, Fut, S>(&self, job: F, shutdown: S) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
        S: Future<Output = ()>,
    {
        match &self.trigger {
            Trigger::Every(period) => run_every(*period, job, shutdown).await,
            Trigger::Cron(schedule) => run_cron(schedule, job, shutdown, Utc::now()).await,
        }
    }
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.trigger.fmt(f)
    }
}

/// Parse a cron expression.
///
/// Five-field crontab syntax (`min hour dom month dow`, Sunday = 0 or 7) is
/// accepted alongside the six- and seven-field forms with a leading seconds
/// field (Sunday = 1).
pub fn parse_cron(expr: &str) -> Result<cron::Schedule, String> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    let normalized = match fields.as_slice() {
        [minute, hour, dom, month, dow] => {
            format!("0 {minute} {hour} {dom} {month} {}", crontab_weekdays(dow)?)
        }
        _ => fields.join(" "),
    };
    cron::Schedule::from_str(&normalized)
        .map_err(|e| format!("invalid cron expression '{expr}': {e}"))
}

/// Shift crontab weekday numbers (Sunday = 0 or 7) to the 1-based numbering
/// used with a seconds field (Sunday = 1). Names and steps pass through.
fn crontab_weekdays(field: &str) -> Result<String, String> {
    let shift = |value: &str| -> Result<String, String> {
        match value.parse::<u8>() {
            Ok(7) | Ok(0) => Ok("1".to_string()),
            Ok(day @ 1..=6) => Ok((day + 1).to_string()),
            Ok(day) => Err(format!("day of week out of range: {day}")),
            Err(_) => Ok(value.to_string()),
        }
    };

    let mut parts = Vec::new();
    for part in field.split(',') {
        let (base, step) = match part.split_once('/') {
            Some((base, step)) => (base, Some(step)),
            None => (part, None),
        };
        let mut shifted = match base.split_once('-') {
            // A range ending on Sunday (7) wraps to the start of the week.
            Some((start, "7")) => {
                parts.push("1".to_string());
                format!("{}-7", shift(start)?)
            }
            Some((start, end)) => format!("{}-{}", shift(start)?, shift(end)?),
            None => shift(base)?,
        };
        if let Some(step) = step {
            shifted = format!("{shifted}/{step}");
        }
        parts.push(shifted);
    }
    Ok(parts.join(","))
}

async fn run_every<F, Fut, S>(period: Duration, mut job: F, shutdown: S) -> u64
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
    S: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    tokio::pin!(shutdown);
    let mut runs = 0u64;
    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                info!(runs, "Scheduler stopped");
                return runs;
            }
            _ = ticker.tick() => {}
        }

        runs += 1;
        debug!(run = runs, "Scheduled run starting");
        job().await;
    }
}

/// Cron loop. Wall-clock time is `started_at` plus the tokio clock's elapsed
/// time, so fire times follow the runtime clock.
async fn run_cron<F, Fut, S>(
    schedule: &cron::Schedule,
    mut job: F,
    shutdown: S,
    started_at: DateTime<Utc>,
) -> u64
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
    S: Future<Output = ()>,
{
    let origin = Instant::now();
    let now = || {
        started_at + chrono::Duration::from_std(origin.elapsed()).unwrap_or(chrono::Duration::zero())
    };

    tokio::pin!(shutdown);
    let mut runs = 0u64;
    loop {
        let current = now();
        let Some(next) = schedule.after(&current).next() else {
            info!(runs, "Cron schedule has no further fire times");
            return runs;
        };
        let wait = (next - current).to_std().unwrap_or(Duration::ZERO);
        debug!(next_run = %next, wait_secs = wait.as_secs(), "Waiting for next scheduled run");

        tokio::select! {
            biased;
            () = &mut shutdown => {
                info!(runs, "Scheduler stopped");
                return runs;
            }
            () = tokio::time::sleep(wait) => {}
        }

        runs += 1;
        debug!(run = runs, "Scheduled run starting");
        job().await;
    }
}
