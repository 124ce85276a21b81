//! League storage interface
//!
//! This module defines the interface for persisting teams and games. All
//! counter changes reach storage through `commit`, which writes one game
//! change together with the affected team records as a single unit.

use crate::error::Result;
use crate::league::{Game, Team};
use crate::types::GameId;

/// The game side of a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameChange {
    /// Store a new game
    Insert(Game),
    /// Replace the scores of an existing game
    Update(Game),
    /// Remove an existing game
    Remove(GameId),
}

impl GameChange {
    pub fn game_id(&self) -> GameId {
        match self {
            GameChange::Insert(game) | GameChange::Update(game) => game.id(),
            GameChange::Remove(game_id) => *game_id,
        }
    }

    /// Operation label for logs and metrics
    pub fn operation(&self) -> &'static str {
        match self {
            GameChange::Insert(_) => "insert",
            GameChange::Update(_) => "update",
            GameChange::Remove(_) => "remove",
        }
    }
}

/// One game change plus the team records it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueChange {
    pub game: GameChange,
    pub teams: Vec<Team>,
}

impl LeagueChange {
    pub fn insert(game: Game, teams: impl IntoIterator<Item = Team>) -> Self {
        Self {
            game: GameChange::Insert(game),
            teams: teams.into_iter().collect(),
        }
    }

    pub fn update(game: Game, teams: impl IntoIterator<Item = Team>) -> Self {
        Self {
            game: GameChange::Update(game),
            teams: teams.into_iter().collect(),
        }
    }

    pub fn remove(game_id: GameId, teams: impl IntoIterator<Item = Team>) -> Self {
        Self {
            game: GameChange::Remove(game_id),
            teams: teams.into_iter().collect(),
        }
    }
}

/// Trait for league storage operations
pub trait LeagueStore: Send + Sync {
    /// Get a team by name
    fn get_team(&self, name: &str) -> Result<Option<Team>>;

    /// Store a new team; fails if the name is taken
    fn insert_team(&self, team: Team) -> Result<()>;

    /// Remove a team that no game references
    ///
    /// Returns `false` if the team did not exist.
    fn remove_team(&self, name: &str) -> Result<bool>;

    /// Get a game by id
    fn get_game(&self, game_id: &GameId) -> Result<Option<Game>>;

    /// All games, oldest first
    fn list_games(&self) -> Result<Vec<Game>>;

    /// Games in which `name` took part, oldest first
    fn games_for_team(&self, name: &str) -> Result<Vec<Game>>;

    /// All teams ordered by points descending, then name ascending
    fn list_teams_by_standing(&self) -> Result<Vec<Team>>;

    /// Apply a game change and its team records atomically
    fn commit(&self, change: LeagueChange) -> Result<()>;

    /// Overwrite existing team records atomically, with no game change
    ///
    /// Fails with `TeamNotFound` if any team is not stored.
    fn update_teams(&self, teams: Vec<Team>) -> Result<()>;

    /// Number of stored teams
    fn team_count(&self) -> Result<usize>;

    /// Number of stored games
    fn game_count(&self) -> Result<usize>;
}
