//! Per-run outcome statistics and the run summary report.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SyncError;
use crate::types::{SourceDevice, WriteKind, WriteOutcome};

/// Category of a logical remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// One complete device listing, however many pages it spans.
    SourceListing,
    Listing,
    Search,
    Create,
    Update,
}

/// Lock-free counters of logical remote operations. Retries and pages are
/// not counted separately.
#[derive(Debug, Default)]
pub struct ApiCallTally {
    source_listings: AtomicU64,
    listings: AtomicU64,
    searches: AtomicU64,
    creates: AtomicU64,
    updates: AtomicU64,
}

impl ApiCallTally {
    pub fn record(&self, kind: CallKind) {
        let counter = match kind {
            CallKind::SourceListing => &self.source_listings,
            CallKind::Listing => &self.listings,
            CallKind::Search => &self.searches,
            CallKind::Create => &self.creates,
            CallKind::Update => &self.updates,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> ApiCallCounts {
        ApiCallCounts {
            source_listings: self.source_listings.load(Ordering::Relaxed),
            listings: self.listings.load(Ordering::Relaxed),
            searches: self.searches.load(Ordering::Relaxed),
            creates: self.creates.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of an [`ApiCallTally`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCallCounts {
    pub source_listings: u64,
    pub listings: u64,
    pub searches: u64,
    pub creates: u64,
    pub updates: u64,
}

impl ApiCallCounts {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.source_listings + self.listings + self.searches + self.creates + self.updates
    }
}

/// A device that could not be synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFailure {
    pub serial: String,
    pub name: String,
    pub kind: String,
    pub message: String,
}

/// Mutable counters for one run. Each device outcome is recorded exactly once.
#[derive(Debug)]
pub struct SyncStatistics {
    pub total_processed: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub created: u64,
    pub updated: u64,
    pub failures: Vec<DeviceFailure>,
    started: Instant,
    started_at: DateTime<Utc>,
}

impl Default for SyncStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncStatistics {
    /// Start the run clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_processed: 0,
            succeeded: 0,
            failed: 0,
            created: 0,
            updated: 0,
            failures: Vec::new(),
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Fold one device outcome into the counters.
    pub fn record(&mut self, device: &SourceDevice, outcome: &Result<WriteOutcome, SyncError>) {
        self.total_processed += 1;
        match outcome {
            Ok(write) => {
                self.succeeded += 1;
                match write.kind {
                    WriteKind::Created => self.created += 1,
                    WriteKind::Updated => self.updated += 1,
                }
            }
            Err(error) => {
                self.failed += 1;
                self.failures.push(DeviceFailure {
                    serial: device.serial.clone(),
                    name: device.display_name().to_string(),
                    kind: error.kind().to_string(),
                    message: error.to_string(),
                });
            }
        }
    }

    /// Stop the clock and freeze the counters into a report.
    #[must_use]
    pub fn finish(self, run_id: Uuid, api_calls: ApiCallCounts) -> SyncReport {
        SyncReport {
            run_id,
            started_at: self.started_at,
            duration_ms: u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
            total_processed: self.total_processed,
            succeeded: self.succeeded,
            failed: self.failed,
            created: self.created,
            updated: self.updated,
            api_calls,
            failures: self.failures,
        }
    }
}

/// Read-only summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub total_processed: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub created: u64,
    pub updated: u64,
    pub api_calls: ApiCallCounts,
    pub failures: Vec<DeviceFailure>,
}

impl SyncReport {
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Percentage of processed devices that synced, 100 for an empty run.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.total_processed == 0 {
            100.0
        } else {
            self.succeeded as f64 * 100.0 / self.total_processed as f64
        }
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sync run {} summary", self.run_id)?;
        writeln!(f, "  Started:          {}", self.started_at.to_rfc3339())?;
        writeln!(f, "  Duration:         {:.2}s", self.duration().as_secs_f64())?;
        writeln!(f, "  Processed:        {}", self.total_processed)?;
        writeln!(
            f,
            "  Succeeded:        {} ({:.1}%)",
            self.succeeded,
            self.success_rate()
        )?;
        writeln!(f, "  Failed:           {}", self.failed)?;
        writeln!(f, "  Created:          {}", self.created)?;
        writeln!(f, "  Updated:          {}", self.updated)?;
        writeln!(
            f,
            "  API calls:        {} (source {}, listings {}, searches {}, creates {}, updates {})",
            self.api_calls.total(),
            self.api_calls.source_listings,
            self.api_calls.listings,
            self.api_calls.searches,
            self.api_calls.creates,
            self.api_calls.updates
        )?;
        for failure in &self.failures {
            writeln!(
                f,
                "  ✗ {} ({}): [{}] {}",
                failure.name, failure.serial, failure.kind, failure.message
            )?;
        }
        Ok(())
    }
}
