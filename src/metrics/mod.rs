//! Metrics for the league service
//!
//! This module provides Prometheus metrics collection for league operations.
//! The HTTP exposition lives in the service layer.

pub mod collector;

pub use collector::{ImportMetrics, LeagueMetrics, MetricsCollector, MetricsTimer, PerformanceMetrics};
