//! Configuration management for the league service
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values.

pub mod app;
pub mod import;
pub mod points;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings, StorageSettings};
pub use import::ImportSettings;
pub use points::{PointsScheme, PointsSettings};
