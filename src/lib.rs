//! Sports League - points and standings for a league of teams
//!
//! This crate records game results between named teams, keeps every
//! team's win/draw/loss counters and points consistent with the stored
//! games through a pluggable points policy, ranks the league, and imports
//! results in bulk from CSV.

pub mod config;
pub mod error;
pub mod import;
pub mod league;
pub mod metrics;
pub mod points;
pub mod service;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LeagueError, Result};
pub use types::*;

// Re-export key components
pub use import::{ImportOptions, ImportReport};
pub use league::{Game, LeagueManager, Team};
pub use points::{PointsPolicy, StandardPointsPolicy, WeightedPointsPolicy};
pub use storage::{InMemoryLeagueStore, LeagueStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
