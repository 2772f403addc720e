//! Scheduled Meraki to Snipe-IT inventory sync.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod scheduler;

pub use config::{AppConfig, ConfigError};
pub use error::{AppError, AppResult};
