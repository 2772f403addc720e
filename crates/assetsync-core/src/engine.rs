//! Sync orchestrator: one full reconciliation run.
//!
//! A run moves through `Init → CacheWarm → Processing → Summarize → Done`.
//! `Init` and `CacheWarm` failures abort the run before any device is
//! touched. During `Processing` each device yields its own
//! `Result<WriteOutcome, SyncError>`, which is folded into the run's
//! [`SyncStatistics`]; one device failing never stops the others.

use std::fmt;
use std::time::Duration;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::cache::TaxonomyCache;
use crate::error::{SyncError, SyncResult};
use crate::gateway::AssetGateway;
use crate::mapper::AssetFieldMapper;
use crate::matcher::AssetMatcher;
use crate::resolver::EntityResolver;
use crate::retry::RetryPolicy;
use crate::stats::{CallKind, SyncReport, SyncStatistics};
use crate::traits::{AssetSystem, DeviceSource};
use crate::types::{SourceDevice, WriteOutcome};
use crate::writer::AssetWriter;

/// Default pause between consecutive devices.
pub const DEFAULT_DEVICE_DELAY: Duration = Duration::from_millis(500);

/// Phase of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Init,
    CacheWarm,
    Processing { index: usize, total: usize },
    Summarize,
    Done,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::CacheWarm => f.write_str("cache_warm"),
            Self::Processing { index, total } => write!(f, "processing {index}/{total}"),
            Self::Summarize => f.write_str("summarize"),
            Self::Done => f.write_str("done"),
        }
    }
}

/// Tunables for a [`SyncEngine`].
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Pause between consecutive devices, independent of retry backoff.
    pub device_delay: Duration,
    /// Retry policy applied to every remote call.
    pub retry: RetryPolicy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            device_delay: DEFAULT_DEVICE_DELAY,
            retry: RetryPolicy::default(),
        }
    }
}

/// Reconciles every device of a [`DeviceSource`] into an [`AssetSystem`].
pub struct SyncEngine<S, A> {
    source: S,
    assets: A,
    settings: SyncSettings,
}

impl<S, A> SyncEngine<S, A>
where
    S: DeviceSource,
    A: AssetSystem,
{
    #[must_use]
    pub fn new(source: S, assets: A, settings: SyncSettings) -> Self {
        Self {
            source,
            assets,
            settings,
        }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub fn asset_system(&self) -> &A {
        &self.assets
    }

    #[must_use]
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Execute one run with a fresh taxonomy cache.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SourceFetchFailed`] when the device listing fails
    /// and the underlying error when the taxonomy bulk load fails. Per-device
    /// errors are recorded in the report instead.
    pub async fn run(&self) -> SyncResult<SyncReport> {
        let run_id = Uuid::new_v4();
        let mut stats = SyncStatistics::new();
        let gateway = AssetGateway::new(&self.assets, &self.settings.retry);

        enter(run_id, SyncPhase::Init);
        gateway.tally().record(CallKind::SourceListing);
        let devices = self
            .source
            .list_devices()
            .await
            .map_err(|e| match e {
                SyncError::SourceFetchFailed(_) => e,
                other => SyncError::SourceFetchFailed(other.to_string()),
            })
            .inspect_err(|e| error!(run_id = %run_id, error = %e, "Sync run aborted"))?;

        if devices.is_empty() {
            info!(run_id = %run_id, "No devices found in source system");
        } else {
            info!(run_id = %run_id, devices = devices.len(), "Fetched source devices");

            enter(run_id, SyncPhase::CacheWarm);
            let mut resolver =
                EntityResolver::new(TaxonomyCache::new(gateway.name_matching()));
            resolver
                .ensure_loaded(&gateway)
                .await
                .inspect_err(|e| error!(run_id = %run_id, error = %e, "Sync run aborted"))?;

            let total = devices.len();
            for (i, device) in devices.iter().enumerate() {
                if i > 0 && !self.settings.device_delay.is_zero() {
                    tokio::time::sleep(self.settings.device_delay).await;
                }

                let phase = SyncPhase::Processing { index: i + 1, total };
                info!(
                    run_id = %run_id,
                    phase = %phase,
                    serial = %device.serial,
                    device = device.display_name(),
                    "Processing device"
                );

                let outcome = Self::sync_device(&gateway, &mut resolver, device).await;
                match &outcome {
                    Ok(write) => info!(
                        serial = %device.serial,
                        id = %write.id,
                        outcome = ?write.kind,
                        "Synced device"
                    ),
                    Err(e) => error!(
                        serial = %device.serial,
                        device = device.display_name(),
                        kind = e.kind(),
                        error = %e,
                        "Failed to sync device"
                    ),
                }
                stats.record(device, &outcome);
            }
        }

        enter(run_id, SyncPhase::Summarize);
        let report = stats.finish(run_id, gateway.tally().snapshot());
        if report.failed > 0 {
            warn!(
                run_id = %run_id,
                failed = report.failed,
                "Sync run completed with device failures"
            );
        }
        info!(
            run_id = %run_id,
            processed = report.total_processed,
            succeeded = report.succeeded,
            failed = report.failed,
            created = report.created,
            updated = report.updated,
            duration_ms = report.duration_ms,
            api_calls = report.api_calls.total(),
            "Sync run completed"
        );
        enter(run_id, SyncPhase::Done);
        Ok(report)
    }

    /// Resolve, map, match and write a single device.
    async fn sync_device(
        gateway: &AssetGateway<'_, A>,
        resolver: &mut EntityResolver,
        device: &SourceDevice,
    ) -> Result<WriteOutcome, SyncError> {
        let category_name = required(device.category_hint.as_deref(), "product type", device)?;
        let model_name = required(device.model_name.as_deref(), "model", device)?;

        let category_id = resolver.resolve_category(gateway, category_name).await?;
        let model_id = resolver
            .resolve_model(gateway, model_name, category_id)
            .await?;

        let fields = AssetFieldMapper::map(device, category_id, model_id);
        let existing = AssetMatcher::find(gateway, &fields.serial, &fields.asset_tag).await?;
        AssetWriter::upsert(gateway, existing.as_ref(), &fields).await
    }
}

fn enter(run_id: Uuid, phase: SyncPhase) {
    info!(run_id = %run_id, phase = %phase, "Sync phase");
}

fn required<'d>(
    value: Option<&'d str>,
    what: &str,
    device: &SourceDevice,
) -> SyncResult<&'d str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(SyncError::InvalidDevice(format!(
            "device {} has no {what}",
            device.serial
        ))),
    }
}
