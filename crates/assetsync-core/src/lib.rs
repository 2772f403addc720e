//! Device-to-asset reconciliation engine.
//!
//! Pulls the device inventory from a [`DeviceSource`] and makes the
//! [`AssetSystem`] reflect it: missing categories and models are created on
//! demand, existing assets are matched by serial or asset tag and updated in
//! place, new devices become new assets. Remote calls go through a bounded
//! rate-limit retry and are tallied into the run's [`SyncReport`].
//!
//! # Example
//!
//! ```ignore
//! use assetsync_core::{SyncEngine, SyncSettings};
//!
//! let engine = SyncEngine::new(meraki, snipeit, SyncSettings::default());
//! let report = engine.run().await?;
//! println!("{report}");
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod mapper;
pub mod matcher;
pub mod resolver;
pub mod retry;
pub mod stats;
pub mod traits;
pub mod types;
pub mod writer;

pub use cache::TaxonomyCache;
pub use engine::{SyncEngine, SyncPhase, SyncSettings, DEFAULT_DEVICE_DELAY};
pub use error::{SyncError, SyncResult};
pub use gateway::AssetGateway;
pub use mapper::AssetFieldMapper;
pub use matcher::AssetMatcher;
pub use resolver::EntityResolver;
pub use retry::RetryPolicy;
pub use stats::{ApiCallCounts, ApiCallTally, CallKind, DeviceFailure, SyncReport, SyncStatistics};
pub use traits::{AssetSystem, DeviceSource};
pub use types::{
    AssetFieldSet, AssetRecord, MatchField, NameMatching, NewTaxonomyEntry, RemoteId,
    SourceDevice, TaxonomyEntry, TaxonomyKind, WriteKind, WriteOutcome,
    READY_TO_DEPLOY_STATUS_ID,
};
