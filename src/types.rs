//! Common types used throughout the league service

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for games
pub type GameId = Uuid;

/// Teams are identified by their unique name
pub type TeamName = String;

/// Outcome category of a game, derived from its two scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Draw,
    FirstTeamWin,
    SecondTeamWin,
}

impl Outcome {
    /// Determine the outcome from the first and second team scores
    pub fn from_scores(first_team_score: u32, second_team_score: u32) -> Self {
        match first_team_score.cmp(&second_team_score) {
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Greater => Outcome::FirstTeamWin,
            std::cmp::Ordering::Less => Outcome::SecondTeamWin,
        }
    }

    /// Counters credited to (first team, second team) under the standard rule
    pub fn counters(self) -> (Counter, Counter) {
        match self {
            Outcome::Draw => (Counter::Draw, Counter::Draw),
            Outcome::FirstTeamWin => (Counter::Win, Counter::Loss),
            Outcome::SecondTeamWin => (Counter::Loss, Counter::Win),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Draw => write!(f, "draw"),
            Outcome::FirstTeamWin => write!(f, "first team win"),
            Outcome::SecondTeamWin => write!(f, "second team win"),
        }
    }
}

/// One of a team's result counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    Win,
    Draw,
    Loss,
}

impl std::fmt::Display for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Counter::Win => write!(f, "wins"),
            Counter::Draw => write!(f, "draws"),
            Counter::Loss => write!(f, "losses"),
        }
    }
}

/// One row of the league table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based position, no gaps
    pub rank: usize,
    pub name: TeamName,
    pub points: u32,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_scores() {
        assert_eq!(Outcome::from_scores(2, 2), Outcome::Draw);
        assert_eq!(Outcome::from_scores(0, 0), Outcome::Draw);
        assert_eq!(Outcome::from_scores(2, 1), Outcome::FirstTeamWin);
        assert_eq!(Outcome::from_scores(2, 3), Outcome::SecondTeamWin);
    }

    #[test]
    fn test_outcome_counters() {
        assert_eq!(Outcome::Draw.counters(), (Counter::Draw, Counter::Draw));
        assert_eq!(
            Outcome::FirstTeamWin.counters(),
            (Counter::Win, Counter::Loss)
        );
        assert_eq!(
            Outcome::SecondTeamWin.counters(),
            (Counter::Loss, Counter::Win)
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&Outcome::FirstTeamWin).unwrap();
        assert_eq!(json, "\"first_team_win\"");
    }
}
