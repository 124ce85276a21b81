//! Test fixtures and helper implementations for integration testing

#![allow(dead_code)]

use sports_league::error::Result;
use sports_league::league::{Game, LeagueManager, Team};
use sports_league::points::{PointsPolicy, StandardPointsPolicy};
use sports_league::storage::{InMemoryLeagueStore, MockLeagueStore};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The results file used by the league's own import tests
pub const TIED_LEAGUE_CSV: &str = "\
Team_1 name,Team_1 score,Team_2 name,Team_2 score
First Team,3,Second Team,3
";

/// A small season with a clear table
pub const SEASON_CSV: &str = "\
Team_1 name,Team_1 score,Team_2 name,Team_2 score
Lions,3,Snakes,3
Tarantulas,1,FC Awesome,0
Lions,1,FC Awesome,1
Tarantulas,3,Snakes,1
Lions,4,Grouches,0
";

/// Manager over a fresh in-memory store
pub fn create_test_manager() -> LeagueManager {
    LeagueManager::new(Arc::new(InMemoryLeagueStore::new()))
}

/// Manager over a mock store the test can make fail
pub fn create_failing_system() -> (LeagueManager, Arc<MockLeagueStore>) {
    let store = Arc::new(MockLeagueStore::new());
    let manager = LeagueManager::new(store.clone());
    (manager, store)
}

/// (wins, draws, losses, points) of a stored team
pub fn team_record(manager: &LeagueManager, name: &str) -> (u32, u32, u32, u32) {
    let team = manager.get_team(name).unwrap();
    (team.wins(), team.draws(), team.losses(), team.points())
}

/// Write `contents` to a fresh file under the system temp directory
pub fn write_temp_csv(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("sports-league-{}.csv", uuid::Uuid::new_v4()));
    std::fs::write(&path, contents).unwrap();
    path
}

/// Standard policy that counts how often it is asked to apply or reverse
#[derive(Debug, Default)]
pub struct CountingPolicy {
    applied: AtomicUsize,
    reversed: AtomicUsize,
}

impl CountingPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }

    pub fn reversed(&self) -> usize {
        self.reversed.load(Ordering::SeqCst)
    }
}

impl PointsPolicy for CountingPolicy {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn compute_score(&self, team: &Team) -> u32 {
        StandardPointsPolicy.compute_score(team)
    }

    fn apply(&self, game: &Game, first: &mut Team, second: &mut Team) -> Result<()> {
        self.applied.fetch_add(1, Ordering::SeqCst);
        StandardPointsPolicy.apply(game, first, second)
    }

    fn reverse(&self, game: &Game, first: &mut Team, second: &mut Team) -> Result<()> {
        self.reversed.fetch_add(1, Ordering::SeqCst);
        StandardPointsPolicy.reverse(game, first, second)
    }
}
