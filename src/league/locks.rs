//! Per-team mutual exclusion
//!
//! Every mutation that touches a team's counters holds that team's lock for
//! its whole read-modify-commit cycle. Locks for several teams are always
//! taken in name order so two operations can never wait on each other.

use crate::error::{LeagueError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// Held locks for a set of teams; released on drop
#[derive(Debug)]
pub struct TeamGuard {
    teams: Vec<String>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl TeamGuard {
    /// Names of the locked teams, sorted
    pub fn teams(&self) -> &[String] {
        &self.teams
    }
}

/// Registry of per-team locks
#[derive(Debug, Default)]
pub struct TeamLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl TeamLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock every named team, in name order
    pub async fn acquire(&self, names: &[&str]) -> Result<TeamGuard> {
        let mut teams: Vec<String> = names.iter().map(|name| name.to_string()).collect();
        teams.sort();
        teams.dedup();

        let handles: Vec<Arc<AsyncMutex<()>>> = {
            let mut locks = self.locks.lock().map_err(|_| LeagueError::Internal {
                message: "Failed to acquire team lock registry".to_string(),
            })?;
            teams
                .iter()
                .map(|name| locks.entry(name.clone()).or_default().clone())
                .collect()
        };

        let mut guards = Vec::with_capacity(handles.len());
        for handle in handles {
            guards.push(handle.lock_owned().await);
        }

        debug!("Acquired team locks: {:?}", teams);
        Ok(TeamGuard {
            teams,
            _guards: guards,
        })
    }

    /// Drop the registry entry of a team nobody is holding
    pub fn forget(&self, name: &str) {
        if let Ok(mut locks) = self.locks.lock() {
            if let Some(handle) = locks.get(name) {
                // The registry itself holds one reference
                if Arc::strong_count(handle) == 1 {
                    locks.remove(name);
                }
            }
        }
    }

    /// Number of teams with a registered lock
    pub fn len(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
