//! Error types for the sync engine and its collaborators.

use thiserror::Error;

use crate::types::{MatchField, TaxonomyKind};

/// Result type alias using `SyncError`.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised while synchronizing devices into the asset system.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A taxonomy entry could not be created remotely.
    #[error("Failed to create {taxonomy} '{name}': {source}")]
    CreationFailed {
        taxonomy: TaxonomyKind,
        name: String,
        #[source]
        source: Box<SyncError>,
    },

    /// An asset search returned more than one exact candidate.
    #[error("Ambiguous match: {count} assets share {field} '{value}'")]
    AmbiguousMatch {
        field: MatchField,
        value: String,
        count: usize,
    },

    /// The remote system asked us to slow down (or the retry budget ran out).
    #[error("Rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Non-retryable remote failure.
    #[error("Remote operation failed ({status}): {body}")]
    RemoteOperationFailed { status: u16, body: String },

    /// The source device listing could not be fetched.
    #[error("Failed to fetch source devices: {0}")]
    SourceFetchFailed(String),

    /// Connection, TLS or timeout error before a response was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote answered with a body we could not decode.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The source device lacks an attribute required to build an asset.
    #[error("Invalid device: {0}")]
    InvalidDevice(String),
}

impl SyncError {
    /// Stable label used in logs and run reports.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreationFailed { .. } => "creation_failed",
            Self::AmbiguousMatch { .. } => "ambiguous_match",
            Self::RateLimited { .. } => "rate_limited",
            Self::RemoteOperationFailed { .. } => "remote_operation_failed",
            Self::SourceFetchFailed(_) => "source_fetch_failed",
            Self::Transport(_) => "transport",
            Self::InvalidResponse(_) => "invalid_response",
            Self::InvalidDevice(_) => "invalid_device",
        }
    }

    /// Whether this error is a rate-limit signal the retry wrapper acts on.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// The server-provided wait hint, if this is a rate-limit error.
    #[must_use]
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_secs } => *retry_after_secs,
            _ => None,
        }
    }
}
