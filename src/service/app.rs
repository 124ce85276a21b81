//! Main application state and service coordination
//!
//! This module contains the AppState that wires configuration, storage,
//! the points policy, the league manager and metrics together, and runs
//! the service's background tasks.

use crate::config::{validate_config, AppConfig};
use crate::league::LeagueManager;
use crate::metrics::MetricsCollector;
use crate::points::build_policy;
use crate::storage::build_store;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, info, warn};

/// How often the league size gauges are refreshed
const SIZE_METRICS_INTERVAL: Duration = Duration::from_secs(30);

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// League manager over the configured store and policy
    league_manager: LeagueManager,

    /// Metrics collector shared with the league manager
    metrics_collector: Arc<MetricsCollector>,

    /// Background task handles
    background_tasks: Mutex<Vec<JoinHandle<()>>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,

    /// When the state was built
    started_at: Instant,
}

impl AppState {
    /// Initialize the application with all dependencies
    ///
    /// Stored points are brought in line with the configured policy before
    /// the state is handed out.
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing sports league service");

        validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        let metrics_collector =
            Arc::new(
                MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create metrics collector: {}", e),
                })?,
            );

        let store = build_store(&config.storage).map_err(|e| ServiceError::Initialization {
            message: format!("Failed to open league store: {}", e),
        })?;

        let policy = build_policy(&config.points).map_err(|e| ServiceError::Configuration {
            message: format!("Failed to build points policy: {}", e),
        })?;

        info!(
            "Configuration: service={}, points={}, snapshot={}",
            config.service.name,
            policy.name(),
            config
                .storage
                .snapshot_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "none".to_string())
        );

        let league_manager =
            LeagueManager::with_policy_and_metrics(store, policy, metrics_collector.clone());

        let recalculated = league_manager.recalculate_points().await.map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to recalculate team points: {}", e),
            }
        })?;
        if recalculated > 0 {
            warn!(
                "Stored points of {} teams did not match policy '{}' and were recalculated",
                recalculated,
                league_manager.policy().name()
            );
        }

        Ok(Self::with_manager(config, league_manager))
    }

    /// Build the state around an existing league manager
    pub fn with_manager(config: AppConfig, league_manager: LeagueManager) -> Self {
        let metrics_collector = league_manager.metrics_collector();
        Self {
            config,
            league_manager,
            metrics_collector,
            background_tasks: Mutex::new(Vec::new()),
            is_running: Arc::new(RwLock::new(false)),
            started_at: Instant::now(),
        }
    }

    /// Start background tasks and mark the service as running
    pub async fn start(&self) -> Result<(), ServiceError> {
        info!("Starting sports league service");

        *self.is_running.write().await = true;

        let size_task = {
            let store = self.league_manager.store();
            let metrics_collector = self.metrics_collector.clone();
            let is_running = self.is_running.clone();

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(SIZE_METRICS_INTERVAL);
                info!("League size metrics task started");

                while *is_running.read().await {
                    interval.tick().await;

                    match (store.team_count(), store.game_count()) {
                        (Ok(teams), Ok(games)) => {
                            debug!("Updating metrics - teams: {}, games: {}", teams, games);
                            metrics_collector.update_league_size(teams, games);
                        }
                        (Err(e), _) | (_, Err(e)) => {
                            warn!("Failed to read league size for metrics update: {}", e);
                        }
                    }
                }

                info!("League size metrics task stopped");
            })
        };

        self.background_tasks.lock().await.push(size_task);

        info!("Sports league service started");
        Ok(())
    }

    /// Stop background tasks and log final statistics
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of sports league service");

        *self.is_running.write().await = false;

        let mut tasks = self.background_tasks.lock().await;
        let task_count = tasks.len();
        for (i, task) in tasks.drain(..).enumerate() {
            debug!("Aborting background task {}/{}", i + 1, task_count);
            task.abort();
        }

        let final_stats =
            self.league_manager
                .stats()
                .map_err(|e| ServiceError::BackgroundTask {
                    message: format!("Failed to get final stats: {}", e),
                })?;

        info!("Final service statistics: {:?}", final_stats);
        info!("Sports league service shutdown completed");
        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Get league manager for operations
    pub fn league_manager(&self) -> &LeagueManager {
        &self.league_manager
    }

    pub fn metrics_collector(&self) -> Arc<MetricsCollector> {
        self.metrics_collector.clone()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
