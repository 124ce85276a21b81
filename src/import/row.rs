//! Game row validation and score coercion

use crate::error::{LeagueError, Result};
use serde::{Deserialize, Serialize};

/// Fields per row: first team, first score, second team, second score
pub const FIELD_COUNT: usize = 4;

/// A validated result row, ready to become a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRow {
    pub first_team: String,
    pub first_team_score: u32,
    pub second_team: String,
    pub second_team_score: u32,
}

impl GameRow {
    /// Build a row from raw text fields
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self> {
        if fields.len() != FIELD_COUNT {
            return Err(LeagueError::validation(
                "row",
                format!(
                    "expected {} fields (first team, first score, second team, second score), found {}",
                    FIELD_COUNT,
                    fields.len()
                ),
            )
            .into());
        }

        Ok(Self {
            first_team: fields[0].as_ref().trim().to_string(),
            first_team_score: parse_score("first team score", fields[1].as_ref())?,
            second_team: fields[2].as_ref().trim().to_string(),
            second_team_score: parse_score("second team score", fields[3].as_ref())?,
        })
    }
}

/// Coerce a score field to a non-negative integer
pub fn parse_score(field: &str, raw: &str) -> Result<u32> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(LeagueError::validation(field, "is required").into());
    }

    match value.parse::<i64>() {
        Ok(score) if score < 0 => Err(LeagueError::validation(
            field,
            format!("must be non-negative, got {}", score),
        )
        .into()),
        Ok(score) => u32::try_from(score).map_err(|_| {
            LeagueError::validation(field, format!("is too large, got {}", score)).into()
        }),
        Err(_) => Err(LeagueError::validation(
            field,
            format!("must be a non-negative integer, got '{}'", value),
        )
        .into()),
    }
}
