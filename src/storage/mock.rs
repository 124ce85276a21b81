//! Mock league storage for testing
//!
//! Wraps the in-memory store, records every commit and can be told to fail
//! commits so callers' failure handling can be exercised.

use crate::error::{LeagueError, Result};
use crate::league::{Game, Team};
use crate::storage::memory::InMemoryLeagueStore;
use crate::storage::store::{LeagueChange, LeagueStore};
use crate::types::GameId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Mock league storage for testing
#[derive(Debug, Default)]
pub struct MockLeagueStore {
    inner: InMemoryLeagueStore,
    commit_calls: RwLock<Vec<LeagueChange>>,
    fail_commits: AtomicBool,
}

impl MockLeagueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following commit fail with a storage error
    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Get all commits attempted (for testing)
    pub fn get_commit_calls(&self) -> Vec<LeagueChange> {
        self.commit_calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Clear recorded commits (for testing)
    pub fn clear_commit_calls(&self) {
        if let Ok(mut calls) = self.commit_calls.write() {
            calls.clear();
        }
    }
}

impl LeagueStore for MockLeagueStore {
    fn get_team(&self, name: &str) -> Result<Option<Team>> {
        self.inner.get_team(name)
    }

    fn insert_team(&self, team: Team) -> Result<()> {
        self.inner.insert_team(team)
    }

    fn remove_team(&self, name: &str) -> Result<bool> {
        self.inner.remove_team(name)
    }

    fn get_game(&self, game_id: &GameId) -> Result<Option<Game>> {
        self.inner.get_game(game_id)
    }

    fn list_games(&self) -> Result<Vec<Game>> {
        self.inner.list_games()
    }

    fn games_for_team(&self, name: &str) -> Result<Vec<Game>> {
        self.inner.games_for_team(name)
    }

    fn list_teams_by_standing(&self) -> Result<Vec<Team>> {
        self.inner.list_teams_by_standing()
    }

    fn commit(&self, change: LeagueChange) -> Result<()> {
        // Record the call for testing
        if let Ok(mut calls) = self.commit_calls.write() {
            calls.push(change.clone());
        }

        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(LeagueError::Storage {
                message: "commit rejected by mock store".to_string(),
            }
            .into());
        }

        self.inner.commit(change)
    }

    fn update_teams(&self, teams: Vec<Team>) -> Result<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(LeagueError::Storage {
                message: "team update rejected by mock store".to_string(),
            }
            .into());
        }

        self.inner.update_teams(teams)
    }

    fn team_count(&self) -> Result<usize> {
        self.inner.team_count()
    }

    fn game_count(&self) -> Result<usize> {
        self.inner.game_count()
    }
}
