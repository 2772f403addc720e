//! Meraki Dashboard device source.
//!
//! Implements [`assetsync_core::DeviceSource`] by listing every device of an
//! organization, following `Link: rel=next` pagination. Each page request is
//! wrapped in the engine's rate-limit retry.

pub mod client;
pub mod models;

pub use client::{MerakiClient, MerakiConfig, DEFAULT_BASE_URL};
pub use models::MerakiDevice;
