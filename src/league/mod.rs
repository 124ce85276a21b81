//! Teams, games and the manager that keeps them consistent
//!
//! This module contains the league entities, per-team locking, ranking
//! and the LeagueManager that applies game results to team records.

pub mod game;
pub mod locks;
pub mod manager;
pub mod ranking;
pub mod team;

pub use game::Game;
pub use locks::{TeamGuard, TeamLocks};
pub use manager::{LeagueManager, LeagueManagerStats};
pub use ranking::{rank_teams, standing_order};
pub use team::{validate_team_name, Team, MAX_TEAM_NAME_LENGTH};
