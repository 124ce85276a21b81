//! In-memory league storage with an optional JSON snapshot file
//!
//! When a snapshot path is configured every mutation is first applied to a
//! copy of the state and written to disk; the in-memory state is only
//! swapped once the write succeeded, so memory and disk never disagree.

use crate::error::{LeagueError, Result};
use crate::league::{Game, Team};
use crate::storage::store::{GameChange, LeagueChange, LeagueStore};
use crate::types::{GameId, TeamName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Everything the league stores
#[derive(Debug, Clone, Default)]
struct LeagueState {
    teams: BTreeMap<TeamName, Team>,
    games: HashMap<GameId, Game>,
}

/// On-disk form of the league state
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    pub teams: Vec<Team>,
    pub games: Vec<Game>,
}

impl LeagueState {
    fn from_snapshot(snapshot: LeagueSnapshot) -> Result<Self> {
        let mut state = LeagueState::default();
        for team in snapshot.teams {
            state.teams.insert(team.name().to_string(), team);
        }
        for game in snapshot.games {
            for name in [game.first_team(), game.second_team()] {
                if !state.teams.contains_key(name) {
                    return Err(LeagueError::Storage {
                        message: format!("snapshot game {} references unknown team '{}'", game.id(), name),
                    }
                    .into());
                }
            }
            state.games.insert(game.id(), game);
        }
        Ok(state)
    }

    fn to_snapshot(&self) -> LeagueSnapshot {
        LeagueSnapshot {
            teams: self.teams.values().cloned().collect(),
            games: sorted_games(self.games.values().cloned().collect()),
        }
    }

    /// Validate the whole change, then apply it
    fn apply(&mut self, change: LeagueChange) -> Result<()> {
        let fixture = match &change.game {
            GameChange::Insert(game) => {
                if self.games.contains_key(&game.id()) {
                    return Err(LeagueError::consistency(format!(
                        "game {} already exists",
                        game.id()
                    ))
                    .into());
                }
                game.clone()
            }
            GameChange::Update(game) => {
                let existing = self.games.get(&game.id()).ok_or(LeagueError::GameNotFound {
                    game_id: game.id(),
                })?;
                if !existing.same_fixture(game) {
                    return Err(LeagueError::consistency(format!(
                        "participants of game {} cannot change",
                        game.id()
                    ))
                    .into());
                }
                existing.clone()
            }
            GameChange::Remove(game_id) => self
                .games
                .get(game_id)
                .cloned()
                .ok_or(LeagueError::GameNotFound { game_id: *game_id })?,
        };

        let mut seen: Vec<&str> = Vec::with_capacity(change.teams.len());
        for team in &change.teams {
            if !fixture.involves(team.name()) {
                return Err(LeagueError::consistency(format!(
                    "team '{}' is not part of game {}",
                    team.name(),
                    fixture.id()
                ))
                .into());
            }
            if seen.contains(&team.name()) {
                return Err(LeagueError::consistency(format!(
                    "team '{}' written twice in one change",
                    team.name()
                ))
                .into());
            }
            seen.push(team.name());
        }

        if let GameChange::Insert(game) = &change.game {
            for name in [game.first_team(), game.second_team()] {
                if !self.teams.contains_key(name) && !seen.contains(&name) {
                    return Err(LeagueError::TeamNotFound {
                        name: name.to_string(),
                    }
                    .into());
                }
            }
        }

        match change.game {
            GameChange::Insert(game) | GameChange::Update(game) => {
                self.games.insert(game.id(), game);
            }
            GameChange::Remove(game_id) => {
                self.games.remove(&game_id);
            }
        }
        for team in change.teams {
            self.teams.insert(team.name().to_string(), team);
        }
        Ok(())
    }

    fn update_teams(&mut self, teams: Vec<Team>) -> Result<()> {
        for team in &teams {
            if !self.teams.contains_key(team.name()) {
                return Err(LeagueError::TeamNotFound {
                    name: team.name().to_string(),
                }
                .into());
            }
        }
        for team in teams {
            self.teams.insert(team.name().to_string(), team);
        }
        Ok(())
    }

    fn insert_team(&mut self, team: Team) -> Result<()> {
        if self.teams.contains_key(team.name()) {
            return Err(LeagueError::TeamAlreadyExists {
                name: team.name().to_string(),
            }
            .into());
        }
        self.teams.insert(team.name().to_string(), team);
        Ok(())
    }

    fn remove_team(&mut self, name: &str) -> Result<bool> {
        if !self.teams.contains_key(name) {
            return Ok(false);
        }
        let referencing = self.games.values().filter(|g| g.involves(name)).count();
        if referencing > 0 {
            return Err(LeagueError::consistency(format!(
                "team '{}' is still referenced by {} game(s)",
                name, referencing
            ))
            .into());
        }
        self.teams.remove(name);
        Ok(true)
    }
}

fn sorted_games(mut games: Vec<Game>) -> Vec<Game> {
    games.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
    games
}

/// In-memory league storage implementation
#[derive(Debug, Default)]
pub struct InMemoryLeagueStore {
    state: RwLock<LeagueState>,
    snapshot_path: Option<PathBuf>,
}

impl InMemoryLeagueStore {
    /// Create an empty, memory-only store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store backed by a JSON snapshot file
    ///
    /// The file is loaded if it exists and rewritten on every mutation.
    pub fn with_snapshot(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let contents = std::fs::read(&path).map_err(|e| LeagueError::Storage {
                message: format!("failed to read snapshot {}: {}", path.display(), e),
            })?;
            let snapshot: LeagueSnapshot =
                serde_json::from_slice(&contents).map_err(|e| LeagueError::Storage {
                    message: format!("failed to parse snapshot {}: {}", path.display(), e),
                })?;
            let state = LeagueState::from_snapshot(snapshot)?;
            info!(
                "Loaded league snapshot from {} - teams: {}, games: {}",
                path.display(),
                state.teams.len(),
                state.games.len()
            );
            state
        } else {
            info!(
                "No league snapshot at {}, starting empty",
                path.display()
            );
            LeagueState::default()
        };

        Ok(Self {
            state: RwLock::new(state),
            snapshot_path: Some(path),
        })
    }

    /// Path of the snapshot file, if any
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LeagueState>> {
        self.state.read().map_err(|_| {
            LeagueError::Internal {
                message: "Failed to acquire league read lock".to_string(),
            }
            .into()
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LeagueState>> {
        self.state.write().map_err(|_| {
            LeagueError::Internal {
                message: "Failed to acquire league write lock".to_string(),
            }
            .into()
        })
    }

    /// Run a mutation so that it either fully lands (in memory and on disk) or not at all
    fn mutate<T>(&self, f: impl FnOnce(&mut LeagueState) -> Result<T>) -> Result<T> {
        let mut state = self.write()?;
        match &self.snapshot_path {
            None => f(&mut *state),
            Some(path) => {
                let mut next = state.clone();
                let value = f(&mut next)?;
                write_snapshot(path, &next.to_snapshot())?;
                *state = next;
                Ok(value)
            }
        }
    }
}

fn write_snapshot(path: &Path, snapshot: &LeagueSnapshot) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(snapshot).map_err(|e| LeagueError::Storage {
        message: format!("failed to encode snapshot: {}", e),
    })?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, &bytes).map_err(|e| LeagueError::Storage {
        message: format!("failed to write snapshot {}: {}", tmp.display(), e),
    })?;
    std::fs::rename(&tmp, path).map_err(|e| LeagueError::Storage {
        message: format!("failed to replace snapshot {}: {}", path.display(), e),
    })?;

    debug!(
        "Wrote league snapshot {} ({} bytes)",
        path.display(),
        bytes.len()
    );
    Ok(())
}

impl LeagueStore for InMemoryLeagueStore {
    fn get_team(&self, name: &str) -> Result<Option<Team>> {
        Ok(self.read()?.teams.get(name).cloned())
    }

    fn insert_team(&self, team: Team) -> Result<()> {
        self.mutate(|state| state.insert_team(team))
    }

    fn remove_team(&self, name: &str) -> Result<bool> {
        if !self.read()?.teams.contains_key(name) {
            return Ok(false);
        }
        self.mutate(|state| state.remove_team(name))
    }

    fn get_game(&self, game_id: &GameId) -> Result<Option<Game>> {
        Ok(self.read()?.games.get(game_id).cloned())
    }

    fn list_games(&self) -> Result<Vec<Game>> {
        let state = self.read()?;
        Ok(sorted_games(state.games.values().cloned().collect()))
    }

    fn games_for_team(&self, name: &str) -> Result<Vec<Game>> {
        let state = self.read()?;
        Ok(sorted_games(
            state
                .games
                .values()
                .filter(|game| game.involves(name))
                .cloned()
                .collect(),
        ))
    }

    fn list_teams_by_standing(&self) -> Result<Vec<Team>> {
        let state = self.read()?;
        let mut teams: Vec<Team> = state.teams.values().cloned().collect();
        teams.sort_by(|a, b| {
            b.points()
                .cmp(&a.points())
                .then_with(|| a.name().cmp(b.name()))
        });
        Ok(teams)
    }

    fn commit(&self, change: LeagueChange) -> Result<()> {
        let game_id = change.game.game_id();
        let operation = change.game.operation();
        self.mutate(|state| state.apply(change))?;
        debug!("Committed league change - {} game {}", operation, game_id);
        Ok(())
    }

    fn update_teams(&self, teams: Vec<Team>) -> Result<()> {
        let count = teams.len();
        self.mutate(|state| state.update_teams(teams))?;
        debug!("Updated {} team records", count);
        Ok(())
    }

    fn team_count(&self) -> Result<usize> {
        Ok(self.read()?.teams.len())
    }

    fn game_count(&self) -> Result<usize> {
        Ok(self.read()?.games.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::{PointsPolicy, StandardPointsPolicy};

    fn temp_snapshot_path() -> PathBuf {
        std::env::temp_dir().join(format!("sports-league-{}.json", uuid::Uuid::new_v4()))
    }

    fn applied(game: &Game) -> (Team, Team) {
        let mut first = Team::new(game.first_team()).unwrap();
        let mut second = Team::new(game.second_team()).unwrap();
        StandardPointsPolicy
            .apply(game, &mut first, &mut second)
            .unwrap();
        (first, second)
    }

    #[test]
    fn test_insert_game_creates_teams() {
        let store = InMemoryLeagueStore::new();
        let game = Game::new("Team 1", 2, "Team 2", 1).unwrap();
        let (first, second) = applied(&game);

        store
            .commit(LeagueChange::insert(game.clone(), [first, second]))
            .unwrap();

        assert_eq!(store.game_count().unwrap(), 1);
        assert_eq!(store.team_count().unwrap(), 2);
        assert_eq!(store.get_team("Team 1").unwrap().unwrap().points(), 3);
        assert_eq!(store.get_game(&game.id()).unwrap().unwrap(), game);
    }

    #[test]
    fn test_insert_without_team_records_fails() {
        let store = InMemoryLeagueStore::new();
        let game = Game::new("Team 1", 2, "Team 2", 1).unwrap();

        let err = store
            .commit(LeagueChange::insert(game, Vec::new()))
            .unwrap_err();
        assert_eq!(
            crate::error::league_error(&err).unwrap().kind(),
            "not_found"
        );
        assert_eq!(store.game_count().unwrap(), 0);
    }

    #[test]
    fn test_commit_rejects_foreign_team() {
        let store = InMemoryLeagueStore::new();
        let game = Game::new("Team 1", 2, "Team 2", 1).unwrap();
        let (first, _) = applied(&game);
        let outsider = Team::new("Team 3").unwrap();

        let err = store
            .commit(LeagueChange::insert(game, [first, outsider]))
            .unwrap_err();
        assert_eq!(
            crate::error::league_error(&err).unwrap().kind(),
            "state_consistency"
        );
        assert_eq!(store.team_count().unwrap(), 0);
    }

    #[test]
    fn test_update_and_remove_unknown_game() {
        let store = InMemoryLeagueStore::new();
        let game = Game::new("Team 1", 2, "Team 2", 1).unwrap();

        let err = store
            .commit(LeagueChange::update(game.clone(), Vec::new()))
            .unwrap_err();
        assert_eq!(
            crate::error::league_error(&err).unwrap().kind(),
            "not_found"
        );

        let err = store
            .commit(LeagueChange::remove(game.id(), Vec::new()))
            .unwrap_err();
        assert_eq!(
            crate::error::league_error(&err).unwrap().kind(),
            "not_found"
        );
    }

    #[test]
    fn test_standing_order() {
        let store = InMemoryLeagueStore::new();
        for (first, second) in [("Bravo", "Alpha"), ("Charlie", "Delta")] {
            let game = Game::new(first, 1, second, 1).unwrap();
            let (a, b) = applied(&game);
            store.commit(LeagueChange::insert(game, [a, b])).unwrap();
        }
        let game = Game::new("Delta", 3, "Alpha", 0).unwrap();
        let mut delta = store.get_team("Delta").unwrap().unwrap();
        let mut alpha = store.get_team("Alpha").unwrap().unwrap();
        StandardPointsPolicy
            .apply(&game, &mut delta, &mut alpha)
            .unwrap();
        store
            .commit(LeagueChange::insert(game, [delta, alpha]))
            .unwrap();

        let names: Vec<String> = store
            .list_teams_by_standing()
            .unwrap()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["Delta", "Alpha", "Bravo", "Charlie"]);
    }

    #[test]
    fn test_remove_team_with_games_is_rejected() {
        let store = InMemoryLeagueStore::new();
        let game = Game::new("Team 1", 2, "Team 2", 1).unwrap();
        let (first, second) = applied(&game);
        store
            .commit(LeagueChange::insert(game.clone(), [first, second]))
            .unwrap();

        assert!(store.remove_team("Team 1").is_err());
        assert!(!store.remove_team("Nobody").unwrap());

        store
            .commit(LeagueChange::remove(game.id(), Vec::new()))
            .unwrap();
        assert!(store.remove_team("Team 1").unwrap());
        assert_eq!(store.team_count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_team_insert() {
        let store = InMemoryLeagueStore::new();
        store.insert_team(Team::new("Team 1").unwrap()).unwrap();
        let err = store.insert_team(Team::new("Team 1").unwrap()).unwrap_err();
        assert_eq!(
            crate::error::league_error(&err).unwrap().kind(),
            "already_exists"
        );
    }

    #[test]
    fn test_snapshot_round_trip() {
        let path = temp_snapshot_path();
        let game = Game::new("Team 1", 2, "Team 2", 2).unwrap();
        {
            let store = InMemoryLeagueStore::with_snapshot(&path).unwrap();
            let (first, second) = applied(&game);
            store
                .commit(LeagueChange::insert(game.clone(), [first, second]))
                .unwrap();
        }

        let reloaded = InMemoryLeagueStore::with_snapshot(&path).unwrap();
        assert_eq!(reloaded.game_count().unwrap(), 1);
        assert_eq!(reloaded.get_team("Team 2").unwrap().unwrap().draws(), 1);
        assert_eq!(reloaded.get_game(&game.id()).unwrap().unwrap(), game);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_update_teams_is_all_or_nothing() {
        let store = InMemoryLeagueStore::new();
        let game = Game::new("Team 1", 2, "Team 2", 1).unwrap();
        let (first, second) = applied(&game);
        store
            .commit(LeagueChange::insert(game, [first.clone(), second]))
            .unwrap();

        let mut rescored = first.clone();
        rescored.refresh_points(&crate::points::WeightedPointsPolicy::new(
            crate::points::PointsWeights::two_for_a_win(),
        )
        .unwrap());
        let err = store
            .update_teams(vec![rescored.clone(), Team::new("Team 9").unwrap()])
            .unwrap_err();
        assert_eq!(
            crate::error::league_error(&err).unwrap().kind(),
            "not_found"
        );
        assert_eq!(store.get_team("Team 1").unwrap().unwrap().points(), 3);

        store.update_teams(vec![rescored]).unwrap();
        assert_eq!(store.get_team("Team 1").unwrap().unwrap().points(), 2);
    }

    #[test]
    fn test_failed_snapshot_write_leaves_memory_untouched() {
        let dir = std::env::temp_dir().join(format!("sports-league-missing-{}", uuid::Uuid::new_v4()));
        let store = InMemoryLeagueStore::with_snapshot(dir.join("league.json")).unwrap();
        let game = Game::new("Team 1", 2, "Team 2", 1).unwrap();
        let (first, second) = applied(&game);

        let err = store
            .commit(LeagueChange::insert(game, [first, second]))
            .unwrap_err();
        assert_eq!(crate::error::league_error(&err).unwrap().kind(), "storage");
        assert_eq!(store.game_count().unwrap(), 0);
        assert_eq!(store.team_count().unwrap(), 0);
    }
}
