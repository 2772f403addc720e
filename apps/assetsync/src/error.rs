//! Application error type and process exit codes.

use assetsync_core::SyncError;
use thiserror::Error;

use crate::config::ConfigError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sync run aborted: {0}")]
    Sync(#[from] SyncError),
}

impl AppError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Sync(_) => 1,
            AppError::Config(_) => 2,
        }
    }
}
