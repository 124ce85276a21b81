//! Utility functions for the league service

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique game ID
pub fn generate_game_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Duration in fractional milliseconds, for log lines
pub fn as_millis(duration: std::time::Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
