//! Main application configuration
//!
//! This module defines the primary configuration structures for the league
//! service, including environment variable and TOML file loading and validation.

use crate::config::import::ImportSettings;
use crate::config::points::{PointsScheme, PointsSettings};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
    pub points: PointsSettings,
    pub import: ImportSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Host the HTTP API binds to
    pub http_host: String,
    /// Port for the HTTP API, health and metrics endpoints
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Persistence settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// JSON snapshot file; the league is kept in memory only when unset
    pub snapshot_path: Option<PathBuf>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "sports-league".to_string(),
            log_level: "info".to_string(),
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse configuration from TOML text; missing sections use defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(host) = env::var("HTTP_HOST") {
            self.service.http_host = host;
        }
        if let Ok(port) = env::var("HTTP_PORT") {
            self.service.http_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Storage settings
        if let Ok(path) = env::var("LEAGUE_SNAPSHOT_PATH") {
            self.storage.snapshot_path = Some(PathBuf::from(path));
        }

        // Points settings
        if let Ok(scheme) = env::var("POINTS_SCHEME") {
            self.points.scheme = scheme.parse()?;
        }
        if let Ok(win) = env::var("POINTS_WIN") {
            self.points.win_points = win
                .parse()
                .map_err(|_| anyhow!("Invalid POINTS_WIN value: {}", win))?;
        }
        if let Ok(draw) = env::var("POINTS_DRAW") {
            self.points.draw_points = draw
                .parse()
                .map_err(|_| anyhow!("Invalid POINTS_DRAW value: {}", draw))?;
        }
        if let Ok(loss) = env::var("POINTS_LOSS") {
            self.points.loss_points = loss
                .parse()
                .map_err(|_| anyhow!("Invalid POINTS_LOSS value: {}", loss))?;
        }

        // Import settings
        if let Ok(has_headers) = env::var("IMPORT_HAS_HEADERS") {
            self.import.has_headers = has_headers
                .parse()
                .map_err(|_| anyhow!("Invalid IMPORT_HAS_HEADERS value: {}", has_headers))?;
        }
        if let Ok(stop) = env::var("IMPORT_STOP_ON_ERROR") {
            self.import.stop_on_error = stop
                .parse()
                .map_err(|_| anyhow!("Invalid IMPORT_STOP_ON_ERROR value: {}", stop))?;
        }
        if let Ok(delimiter) = env::var("IMPORT_DELIMITER") {
            let mut chars = delimiter.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => self.import.delimiter = c,
                _ => return Err(anyhow!("Invalid IMPORT_DELIMITER value: {}", delimiter)),
            }
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Address the HTTP server binds to
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.service.http_host, self.service.http_port)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }
    if config.service.http_host.is_empty() {
        return Err(anyhow!("HTTP host cannot be empty"));
    }
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    if config.points.scheme == PointsScheme::Weighted {
        config.points.weights().validate()?;
    }

    let delimiter = config.import.delimiter;
    if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' || delimiter == '\r' {
        return Err(anyhow!("Invalid import delimiter: {:?}", delimiter));
    }

    Ok(())
}
