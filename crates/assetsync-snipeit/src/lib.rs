//! Snipe-IT asset system.
//!
//! Implements [`assetsync_core::AssetSystem`] on top of the Snipe-IT REST API
//! (`/api/v1`): paged category and model listings, taxonomy creation, hardware
//! search and hardware create/update.

pub mod client;
pub mod models;

pub use client::{SnipeItClient, SnipeItConfig};
