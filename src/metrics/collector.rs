//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the league service: game
//! mutations, failed operations, imported rows, operation latency and the
//! size of the league.

use anyhow::Result;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the league service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Game and team mutation metrics
    league_metrics: LeagueMetrics,

    /// Bulk import metrics
    import_metrics: ImportMetrics,

    /// Performance metrics
    performance_metrics: PerformanceMetrics,
}

/// Game and team mutation metrics
#[derive(Clone)]
pub struct LeagueMetrics {
    /// Successful game mutations by operation (create, edit, delete)
    pub games_total: IntCounterVec,

    /// Failed operations by operation name
    pub operation_errors_total: IntCounterVec,

    /// Number of stored teams
    pub teams: IntGauge,

    /// Number of stored games
    pub games: IntGauge,
}

/// Bulk import metrics
#[derive(Clone)]
pub struct ImportMetrics {
    /// Import rows by status (imported, rejected, skipped)
    pub rows_total: IntCounterVec,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Operation durations
    pub operation_duration: HistogramVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let league_metrics = LeagueMetrics::new(&registry)?;
        let import_metrics = ImportMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            league_metrics,
            import_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn league(&self) -> &LeagueMetrics {
        &self.league_metrics
    }

    pub fn import(&self) -> &ImportMetrics {
        &self.import_metrics
    }

    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record a successful game mutation
    pub fn record_game_operation(&self, operation: &str, duration: Duration) {
        self.league_metrics
            .games_total
            .with_label_values(&[operation])
            .inc();
        self.record_operation_duration(operation, duration);
    }

    /// Record a failed operation
    pub fn record_operation_error(&self, operation: &str) {
        self.league_metrics
            .operation_errors_total
            .with_label_values(&[operation])
            .inc();
    }

    /// Record operation duration
    pub fn record_operation_duration(&self, operation: &str, duration: Duration) {
        self.performance_metrics
            .operation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Record one processed import row
    pub fn record_import_row(&self, status: &str) {
        self.import_metrics
            .rows_total
            .with_label_values(&[status])
            .inc();
    }

    /// Update the league size gauges
    pub fn update_league_size(&self, teams: usize, games: usize) {
        self.league_metrics.teams.set(teams as i64);
        self.league_metrics.games.set(games as i64);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl LeagueMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let games_total = IntCounterVec::new(
            Opts::new("sports_league_games_total", "Total game mutations"),
            &["operation"],
        )?;
        registry.register(Box::new(games_total.clone()))?;

        let operation_errors_total = IntCounterVec::new(
            Opts::new(
                "sports_league_operation_errors_total",
                "Total failed league operations",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(operation_errors_total.clone()))?;

        let teams = IntGauge::new("sports_league_teams", "Number of teams")?;
        registry.register(Box::new(teams.clone()))?;

        let games = IntGauge::new("sports_league_games", "Number of games")?;
        registry.register(Box::new(games.clone()))?;

        Ok(Self {
            games_total,
            operation_errors_total,
            teams,
            games,
        })
    }
}

impl ImportMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let rows_total = IntCounterVec::new(
            Opts::new("sports_league_import_rows_total", "Total CSV rows processed"),
            &["status"],
        )?;
        registry.register(Box::new(rows_total.clone()))?;

        Ok(Self { rows_total })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "sports_league_operation_duration_seconds",
                "League operation duration",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self { operation_duration })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}
