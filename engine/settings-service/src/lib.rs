//! # Settings Service
//!
//! Resolves, patches and persists the [`Settings`](valuation_engine::Settings)
//! snapshots the valuation engine runs against.
//!
//! ## Architecture
//!
//! - **SettingsStore**: async persistence seam for settings rows
//! - **InMemorySettingsStore**: `DashMap`-backed store for tests and one-shot runs
//! - **LocalSettingsStore**: one JSON file per scope
//! - **SettingsResolver**: franchise lookup with default fallback, patch-merge-persist
//!   and default seeding
//!
//! ## Usage
//!
//! ```rust
//! use settings_service::{InMemorySettingsStore, SettingsResolver};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = SettingsResolver::new(Arc::new(InMemorySettingsStore::new()));
//!     resolver.seed_default().await?;
//!     let settings = resolver.resolve(Some("franchise-7")).await?;
//!     assert_eq!(settings.version, 1);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod resolver;
pub mod store;

#[cfg(test)]
mod tests;

pub use config::{SettingsServiceConfig, StoreKind};
pub use error::{Result, SettingsServiceError};
pub use resolver::SettingsResolver;
pub use store::{create_store, InMemorySettingsStore, LocalSettingsStore, SettingsRecord, SettingsScope, SettingsStore};

pub use chrono::{DateTime, Utc};
