//! Game entity

use crate::error::{LeagueError, Result};
use crate::league::team::validate_team_name;
use crate::types::{GameId, Outcome, TeamName};
use crate::utils::{current_timestamp, generate_game_id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed match between two distinct teams
///
/// Scores are read-only outside the crate; the league manager's edit path
/// is the only way to change them, so a game's recorded effect on team
/// counters can always be reversed with the scores it was applied with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    id: GameId,
    first_team: TeamName,
    first_team_score: u32,
    second_team: TeamName,
    second_team_score: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Game {
    /// Create a new game record with a fresh id
    pub fn new(
        first_team: &str,
        first_team_score: u32,
        second_team: &str,
        second_team_score: u32,
    ) -> Result<Self> {
        let first_team = validate_team_name(first_team)?;
        let second_team = validate_team_name(second_team)?;
        if first_team == second_team {
            return Err(LeagueError::validation(
                "second team",
                format!("a team cannot play itself ('{}')", first_team),
            )
            .into());
        }

        let now = current_timestamp();
        Ok(Self {
            id: generate_game_id(),
            first_team,
            first_team_score,
            second_team,
            second_team_score,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn first_team(&self) -> &str {
        &self.first_team
    }

    pub fn second_team(&self) -> &str {
        &self.second_team
    }

    pub fn first_team_score(&self) -> u32 {
        self.first_team_score
    }

    pub fn second_team_score(&self) -> u32 {
        self.second_team_score
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_scores(self.first_team_score, self.second_team_score)
    }

    pub fn is_draw(&self) -> bool {
        self.outcome() == Outcome::Draw
    }

    /// Name of the winning team, `None` on a draw
    pub fn winner(&self) -> Option<&str> {
        match self.outcome() {
            Outcome::Draw => None,
            Outcome::FirstTeamWin => Some(&self.first_team),
            Outcome::SecondTeamWin => Some(&self.second_team),
        }
    }

    /// Name of the losing team, `None` on a draw
    pub fn loser(&self) -> Option<&str> {
        match self.outcome() {
            Outcome::Draw => None,
            Outcome::FirstTeamWin => Some(&self.second_team),
            Outcome::SecondTeamWin => Some(&self.first_team),
        }
    }

    pub fn is_winner(&self, team: &str) -> bool {
        self.winner() == Some(team)
    }

    pub fn is_loser(&self, team: &str) -> bool {
        self.loser() == Some(team)
    }

    /// Whether `team` is one of the two participants
    pub fn involves(&self, team: &str) -> bool {
        self.first_team == team || self.second_team == team
    }

    /// Same id and participants as `other`
    pub fn same_fixture(&self, other: &Game) -> bool {
        self.id == other.id
            && self.first_team == other.first_team
            && self.second_team == other.second_team
    }

    pub(crate) fn set_scores(&mut self, first_team_score: u32, second_team_score: u32) {
        self.first_team_score = first_team_score;
        self.second_team_score = second_team_score;
        self.updated_at = current_timestamp();
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}-{} {}",
            self.first_team, self.first_team_score, self.second_team_score, self.second_team
        )
    }
}
