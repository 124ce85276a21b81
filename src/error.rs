//! Error types for the league service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application. Typed errors are recovered at the edges with
//! `downcast_ref::<LeagueError>()`.

use crate::types::GameId;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific league scenarios
#[derive(Debug, thiserror::Error)]
pub enum LeagueError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Team not found: {name}")]
    TeamNotFound { name: String },

    #[error("Game not found: {game_id}")]
    GameNotFound { game_id: GameId },

    #[error("Team already exists: {name}")]
    TeamAlreadyExists { name: String },

    #[error("Inconsistent league state: {reason}")]
    StateConsistency { reason: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal service error: {message}")]
    Internal { message: String },
}

impl LeagueError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn consistency(reason: impl Into<String>) -> Self {
        Self::StateConsistency {
            reason: reason.into(),
        }
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            LeagueError::Validation { .. } => "validation",
            LeagueError::TeamNotFound { .. } | LeagueError::GameNotFound { .. } => "not_found",
            LeagueError::TeamAlreadyExists { .. } => "already_exists",
            LeagueError::StateConsistency { .. } => "state_consistency",
            LeagueError::Storage { .. } => "storage",
            LeagueError::Configuration { .. } => "configuration",
            LeagueError::Internal { .. } => "internal",
        }
    }

    /// Whether the error was caused by caller input rather than the service
    pub fn is_validation(&self) -> bool {
        matches!(self, LeagueError::Validation { .. })
    }
}

/// Look through an anyhow error for a typed league error
pub fn league_error(err: &anyhow::Error) -> Option<&LeagueError> {
    err.downcast_ref::<LeagueError>()
}
