//! Team entity
//!
//! A team is identified by its unique name and carries win/draw/loss
//! counters plus the ranking points derived from them by the active
//! points policy.

use crate::error::{LeagueError, Result};
use crate::points::PointsPolicy;
use crate::types::{Counter, TeamName};
use crate::utils::current_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted team name, in characters
pub const MAX_TEAM_NAME_LENGTH: usize = 300;

/// Validate and normalize a team name
///
/// Surrounding whitespace is trimmed; names are otherwise compared exactly.
pub fn validate_team_name(name: &str) -> Result<TeamName> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LeagueError::validation("team name", "must not be empty").into());
    }
    if trimmed.chars().count() > MAX_TEAM_NAME_LENGTH {
        return Err(LeagueError::validation(
            "team name",
            format!("must be at most {} characters", MAX_TEAM_NAME_LENGTH),
        )
        .into());
    }
    Ok(trimmed.to_string())
}

/// A league team and its aggregate results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    name: TeamName,
    wins: u32,
    draws: u32,
    losses: u32,
    points: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Team {
    /// Create a team with zero counters
    pub fn new(name: &str) -> Result<Self> {
        let name = validate_team_name(name)?;
        let now = current_timestamp();
        Ok(Self {
            name,
            wins: 0,
            draws: 0,
            losses: 0,
            points: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn draws(&self) -> u32 {
        self.draws
    }

    pub fn losses(&self) -> u32 {
        self.losses
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn games_played(&self) -> u32 {
        self.wins
            .saturating_add(self.draws)
            .saturating_add(self.losses)
    }

    /// Current value of one counter
    pub fn counter(&self, counter: Counter) -> u32 {
        match counter {
            Counter::Win => self.wins,
            Counter::Draw => self.draws,
            Counter::Loss => self.losses,
        }
    }

    fn counter_mut(&mut self, counter: Counter) -> &mut u32 {
        match counter {
            Counter::Win => &mut self.wins,
            Counter::Draw => &mut self.draws,
            Counter::Loss => &mut self.losses,
        }
    }

    /// Add one result to a counter
    pub fn record(&mut self, counter: Counter) -> Result<()> {
        let name = self.name.clone();
        let value = self.counter_mut(counter);
        *value = value.checked_add(1).ok_or_else(|| {
            LeagueError::consistency(format!("{} of team '{}' would overflow", counter, name))
        })?;
        self.touch();
        Ok(())
    }

    /// Take one result back from a counter
    ///
    /// Counters never go negative: retracting from zero means the result
    /// being reversed was never applied.
    pub fn retract(&mut self, counter: Counter) -> Result<()> {
        let name = self.name.clone();
        let value = self.counter_mut(counter);
        *value = value.checked_sub(1).ok_or_else(|| {
            LeagueError::consistency(format!(
                "{} of team '{}' would become negative",
                counter, name
            ))
        })?;
        self.touch();
        Ok(())
    }

    /// Recompute the stored points from the current counters
    pub fn refresh_points<P: PointsPolicy + ?Sized>(&mut self, policy: &P) {
        self.points = policy.compute_score(self);
    }

    /// Whether the stored points match what `policy` computes now
    pub fn points_in_sync<P: PointsPolicy + ?Sized>(&self, policy: &P) -> bool {
        self.points == policy.compute_score(self)
    }

    fn touch(&mut self) {
        self.updated_at = current_timestamp();
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
