//! League persistence
//!
//! This module defines the storage interface the league manager writes
//! through, with in-memory (optionally snapshot-backed) and mock
//! implementations.

pub mod memory;
pub mod mock;
pub mod store;

// Re-export commonly used types
pub use memory::{InMemoryLeagueStore, LeagueSnapshot};
pub use mock::MockLeagueStore;
pub use store::{GameChange, LeagueChange, LeagueStore};

use crate::config::StorageSettings;
use crate::error::Result;
use std::sync::Arc;

/// Build the configured store
pub fn build_store(settings: &StorageSettings) -> Result<Arc<dyn LeagueStore>> {
    match &settings.snapshot_path {
        Some(path) => Ok(Arc::new(InMemoryLeagueStore::with_snapshot(path)?)),
        None => Ok(Arc::new(InMemoryLeagueStore::new())),
    }
}
