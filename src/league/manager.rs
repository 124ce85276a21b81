//! League manager implementation
//!
//! This module provides the LeagueManager that keeps team counters and
//! points consistent with the stored games. Every mutation locks the teams
//! it touches, recomputes their records through a points policy on
//! in-memory copies, and writes the game and both teams in one storage
//! commit.

use crate::error::{league_error, LeagueError, Result};
use crate::import::{read_records, CsvRecord, GameRow, ImportOptions, ImportReport, RowFailure};
use crate::league::{rank_teams, Game, Team, TeamLocks};
use crate::metrics::{MetricsCollector, MetricsTimer};
use crate::points::{PointsPolicy, StandardPointsPolicy};
use crate::storage::{LeagueChange, LeagueStore};
use crate::types::{GameId, Standing};
use crate::utils::as_millis;
use std::io::Read;
use std::sync::{Arc, RwLock};
use tracing::{debug, error, info, warn};

/// Operations counted in the games metric
const GAME_OPERATIONS: [&str; 3] = ["create", "edit", "delete"];

/// Statistics about league manager operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeagueManagerStats {
    /// Total number of games created
    pub games_created: u64,
    /// Total number of games whose scores were edited
    pub games_edited: u64,
    /// Total number of games deleted
    pub games_deleted: u64,
    /// Total number of teams created explicitly
    pub teams_created: u64,
    /// Total number of teams deleted
    pub teams_deleted: u64,
    /// Total number of CSV rows imported
    pub rows_imported: u64,
    /// Total number of CSV rows rejected
    pub rows_rejected: u64,
    /// Total number of failed operations
    pub failed_operations: u64,
}

/// The league statistics manager
#[derive(Clone)]
pub struct LeagueManager {
    /// Persistence for teams and games
    store: Arc<dyn LeagueStore>,
    /// Policy used when a caller does not supply one
    policy: Arc<dyn PointsPolicy>,
    /// Per-team locks serializing counter updates
    team_locks: Arc<TeamLocks>,
    /// Manager statistics
    stats: Arc<RwLock<LeagueManagerStats>>,
    /// Metrics collector for recording performance data
    metrics_collector: Arc<MetricsCollector>,
}

impl LeagueManager {
    /// Create a league manager using the standard 3/1/0 policy
    pub fn new(store: Arc<dyn LeagueStore>) -> Self {
        Self::with_policy(store, Arc::new(StandardPointsPolicy))
    }

    /// Create a league manager with a custom default policy
    pub fn with_policy(store: Arc<dyn LeagueStore>, policy: Arc<dyn PointsPolicy>) -> Self {
        // Create a default metrics collector if none provided
        let metrics_collector = Arc::new(MetricsCollector::new().unwrap_or_else(|_| {
            warn!("Failed to create metrics collector, using default");
            MetricsCollector::default()
        }));

        Self::with_policy_and_metrics(store, policy, metrics_collector)
    }

    /// Create a league manager with a custom policy and metrics collector
    pub fn with_policy_and_metrics(
        store: Arc<dyn LeagueStore>,
        policy: Arc<dyn PointsPolicy>,
        metrics_collector: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            store,
            policy,
            team_locks: Arc::new(TeamLocks::new()),
            stats: Arc::new(RwLock::new(LeagueManagerStats::default())),
            metrics_collector,
        }
    }

    /// The default points policy
    pub fn policy(&self) -> Arc<dyn PointsPolicy> {
        self.policy.clone()
    }

    pub fn store(&self) -> Arc<dyn LeagueStore> {
        self.store.clone()
    }

    pub fn metrics_collector(&self) -> Arc<MetricsCollector> {
        self.metrics_collector.clone()
    }

    /// Record a played game and credit its result to both teams
    ///
    /// Teams that do not exist yet are created with zero counters in the
    /// same commit as the game.
    pub async fn create_game(
        &self,
        first_team: &str,
        first_team_score: u32,
        second_team: &str,
        second_team_score: u32,
    ) -> Result<Game> {
        let policy = self.policy.clone();
        self.create_game_with_policy(
            first_team,
            first_team_score,
            second_team,
            second_team_score,
            policy.as_ref(),
        )
        .await
    }

    /// Record a played game using a specific points policy
    pub async fn create_game_with_policy(
        &self,
        first_team: &str,
        first_team_score: u32,
        second_team: &str,
        second_team_score: u32,
        policy: &dyn PointsPolicy,
    ) -> Result<Game> {
        let timer = self.metrics_collector.start_timer();
        let result = self
            .do_create_game(
                first_team,
                first_team_score,
                second_team,
                second_team_score,
                policy,
            )
            .await;
        self.observe("create", timer, &result);
        result
    }

    async fn do_create_game(
        &self,
        first_team: &str,
        first_team_score: u32,
        second_team: &str,
        second_team_score: u32,
        policy: &dyn PointsPolicy,
    ) -> Result<Game> {
        let game = Game::new(first_team, first_team_score, second_team, second_team_score)?;

        let _guard = self
            .team_locks
            .acquire(&[game.first_team(), game.second_team()])
            .await?;

        let mut first = self.resolve_team(game.first_team())?;
        let mut second = self.resolve_team(game.second_team())?;
        policy.apply(&game, &mut first, &mut second)?;

        let (first_points, second_points) = (first.points(), second.points());
        self.store
            .commit(LeagueChange::insert(game.clone(), [first, second]))?;

        self.update_stats(|stats| stats.games_created += 1);
        info!(
            "Created game {} ({}) with policy '{}': '{}' now {} pts, '{}' now {} pts",
            game.id(),
            game,
            policy.name(),
            game.first_team(),
            first_points,
            game.second_team(),
            second_points
        );
        Ok(game)
    }

    /// Change the scores of a recorded game
    ///
    /// The game's old result is taken back from both teams and the new
    /// result credited, in one commit.
    pub async fn edit_game(
        &self,
        game_id: GameId,
        first_team_score: u32,
        second_team_score: u32,
    ) -> Result<Game> {
        let policy = self.policy.clone();
        self.edit_game_with_policy(game_id, first_team_score, second_team_score, policy.as_ref())
            .await
    }

    /// Change the scores of a recorded game using a specific points policy
    pub async fn edit_game_with_policy(
        &self,
        game_id: GameId,
        first_team_score: u32,
        second_team_score: u32,
        policy: &dyn PointsPolicy,
    ) -> Result<Game> {
        let timer = self.metrics_collector.start_timer();
        let result = self
            .do_edit_game(game_id, first_team_score, second_team_score, policy)
            .await;
        self.observe("edit", timer, &result);
        result
    }

    async fn do_edit_game(
        &self,
        game_id: GameId,
        first_team_score: u32,
        second_team_score: u32,
        policy: &dyn PointsPolicy,
    ) -> Result<Game> {
        let game = self.require_game(&game_id)?;
        let _guard = self
            .team_locks
            .acquire(&[game.first_team(), game.second_team()])
            .await?;

        // Participants never change, so the held locks still cover the game
        let mut game = self.require_game(&game_id)?;
        let mut first = self.require_team(game.first_team())?;
        let mut second = self.require_team(game.second_team())?;

        let previous = game.to_string();
        policy.reverse(&game, &mut first, &mut second)?;
        game.set_scores(first_team_score, second_team_score);
        policy.apply(&game, &mut first, &mut second)?;

        let (first_points, second_points) = (first.points(), second.points());
        self.store
            .commit(LeagueChange::update(game.clone(), [first, second]))?;

        self.update_stats(|stats| stats.games_edited += 1);
        info!(
            "Edited game {}: {} -> {}; '{}' now {} pts, '{}' now {} pts",
            game.id(),
            previous,
            game,
            game.first_team(),
            first_points,
            game.second_team(),
            second_points
        );
        Ok(game)
    }

    /// Delete a recorded game and take its result back from both teams
    pub async fn delete_game(&self, game_id: GameId) -> Result<()> {
        let policy = self.policy.clone();
        self.delete_game_with_policy(game_id, policy.as_ref()).await
    }

    /// Delete a recorded game using a specific points policy
    pub async fn delete_game_with_policy(
        &self,
        game_id: GameId,
        policy: &dyn PointsPolicy,
    ) -> Result<()> {
        let timer = self.metrics_collector.start_timer();
        let result = self.do_delete_game(game_id, policy).await;
        self.observe("delete", timer, &result);
        result
    }

    async fn do_delete_game(&self, game_id: GameId, policy: &dyn PointsPolicy) -> Result<()> {
        let game = self.require_game(&game_id)?;
        let _guard = self
            .team_locks
            .acquire(&[game.first_team(), game.second_team()])
            .await?;

        // A concurrent delete of the same game fails here instead of
        // reversing its result a second time
        let game = self.require_game(&game_id)?;
        let mut first = self.require_team(game.first_team())?;
        let mut second = self.require_team(game.second_team())?;
        policy.reverse(&game, &mut first, &mut second)?;

        let (first_points, second_points) = (first.points(), second.points());
        self.store.commit(LeagueChange::remove(game_id, [first, second]))?;

        self.update_stats(|stats| stats.games_deleted += 1);
        info!(
            "Deleted game {} ({}); '{}' now {} pts, '{}' now {} pts",
            game_id,
            game,
            game.first_team(),
            first_points,
            game.second_team(),
            second_points
        );
        Ok(())
    }

    /// Register a team with zero counters
    pub async fn create_team(&self, name: &str) -> Result<Team> {
        let timer = self.metrics_collector.start_timer();
        let result = self.do_create_team(name).await;
        self.observe("create_team", timer, &result);
        result
    }

    async fn do_create_team(&self, name: &str) -> Result<Team> {
        let team = Team::new(name)?;
        let _guard = self.team_locks.acquire(&[team.name()]).await?;

        if self.store.get_team(team.name())?.is_some() {
            return Err(LeagueError::TeamAlreadyExists {
                name: team.name().to_string(),
            }
            .into());
        }
        self.store.insert_team(team.clone())?;

        self.update_stats(|stats| stats.teams_created += 1);
        info!("Created team '{}'", team.name());
        Ok(team)
    }

    /// Delete a team together with every game it played
    ///
    /// Each game is deleted through the regular delete path, so opponents
    /// lose the results they earned against this team. Returns the number
    /// of games deleted.
    pub async fn delete_team(&self, name: &str) -> Result<usize> {
        let timer = self.metrics_collector.start_timer();
        let result = self.do_delete_team(name).await;
        self.observe("delete_team", timer, &result);
        result
    }

    async fn do_delete_team(&self, name: &str) -> Result<usize> {
        let name = crate::league::validate_team_name(name)?;
        self.require_team(&name)?;

        let mut deleted = 0;
        loop {
            let games = self.store.games_for_team(&name)?;
            if games.is_empty() {
                break;
            }
            for game in games {
                match self.delete_game(game.id()).await {
                    Ok(()) => deleted += 1,
                    Err(e) if matches!(league_error(&e), Some(LeagueError::GameNotFound { .. })) => {
                        debug!("Game {} already deleted", game.id());
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        {
            let _guard = self.team_locks.acquire(&[name.as_str()]).await?;
            if !self.store.remove_team(&name)? {
                return Err(LeagueError::TeamNotFound { name }.into());
            }
        }
        self.team_locks.forget(&name);

        self.update_stats(|stats| stats.teams_deleted += 1);
        info!("Deleted team '{}' and {} of its games", name, deleted);
        Ok(deleted)
    }

    /// Recompute every team's points under the manager's policy
    ///
    /// Stored points can predate the active policy, e.g. a snapshot written
    /// under another scheme. All teams are locked for the pass and every
    /// out-of-date record is written in one update. Returns the number of
    /// teams whose points changed.
    pub async fn recalculate_points(&self) -> Result<usize> {
        let timer = self.metrics_collector.start_timer();
        let result = self.do_recalculate_points().await;
        self.observe("recalculate_points", timer, &result);
        result
    }

    async fn do_recalculate_points(&self) -> Result<usize> {
        let names: Vec<String> = self
            .store
            .list_teams_by_standing()?
            .iter()
            .map(|team| team.name().to_string())
            .collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let _guard = self.team_locks.acquire(&name_refs).await?;

        let mut stale = Vec::new();
        for name in &names {
            let mut team = match self.store.get_team(name)? {
                Some(team) => team,
                // Deleted between listing and locking
                None => continue,
            };
            if !team.points_in_sync(self.policy.as_ref()) {
                let previous = team.points();
                team.refresh_points(self.policy.as_ref());
                debug!(
                    "Team '{}' points {} -> {} under policy '{}'",
                    name,
                    previous,
                    team.points(),
                    self.policy.name()
                );
                stale.push(team);
            }
        }

        let updated = stale.len();
        if updated > 0 {
            self.store.update_teams(stale)?;
            info!(
                "Recalculated points of {} of {} teams under policy '{}'",
                updated,
                names.len(),
                self.policy.name()
            );
        }
        Ok(updated)
    }

    /// Get a team by name
    pub fn get_team(&self, name: &str) -> Result<Team> {
        self.require_team(name.trim())
    }

    /// Get a game by id
    pub fn get_game(&self, game_id: GameId) -> Result<Game> {
        self.require_game(&game_id)
    }

    /// All games, oldest first
    pub fn list_games(&self) -> Result<Vec<Game>> {
        self.store.list_games()
    }

    /// Games a team took part in, oldest first
    pub fn games_for_team(&self, name: &str) -> Result<Vec<Game>> {
        let team = self.require_team(name.trim())?;
        self.store.games_for_team(team.name())
    }

    /// Current league table
    pub fn standings(&self) -> Result<Vec<Standing>> {
        let timer = self.metrics_collector.start_timer();
        let standings = rank_teams(self.store.list_teams_by_standing()?);
        let duration = timer.stop();
        self.metrics_collector
            .record_operation_duration("standings", duration);
        debug!(
            "Ranked {} teams in {:.3}ms",
            standings.len(),
            as_millis(duration)
        );
        Ok(standings)
    }

    /// Get manager statistics
    pub fn stats(&self) -> Result<LeagueManagerStats> {
        let stats = self.stats.read().map_err(|_| LeagueError::Internal {
            message: "Failed to acquire stats lock".to_string(),
        })?;
        Ok(stats.clone())
    }

    /// Create one game per record, in order
    ///
    /// Rows that fail validation are reported and skipped unless
    /// `stop_on_error` is set. Any other failure is reported and ends the
    /// batch; rows imported before it stay imported.
    pub async fn import_rows<I>(&self, records: I, stop_on_error: bool) -> ImportReport
    where
        I: IntoIterator<Item = std::result::Result<CsvRecord, RowFailure>>,
    {
        let timer = self.metrics_collector.start_timer();
        let mut report = ImportReport::default();
        let mut records = records.into_iter();

        while let Some(record) = records.next() {
            let record = match record {
                Ok(record) => record,
                Err(failure) => {
                    warn!("Rejected row at line {}: {}", failure.line, failure.message);
                    self.metrics_collector.record_import_row("rejected");
                    report.record_failure(failure);
                    if stop_on_error {
                        report.aborted = true;
                        break;
                    }
                    continue;
                }
            };

            match self.import_record(&record).await {
                Ok(game) => {
                    self.metrics_collector.record_import_row("imported");
                    report.record_success(game.id());
                }
                Err(e) => {
                    let typed = league_error(&e);
                    let kind = typed.map(LeagueError::kind).unwrap_or("internal");
                    let is_validation = typed.map(LeagueError::is_validation).unwrap_or(false);

                    warn!("Rejected row at line {}: {}", record.line, e);
                    self.metrics_collector.record_import_row("rejected");
                    report.record_failure(RowFailure::new(record.line, kind, e.to_string()));

                    if stop_on_error || !is_validation {
                        report.aborted = true;
                        break;
                    }
                }
            }
        }

        if report.aborted {
            report.skipped = records.count();
            for _ in 0..report.skipped {
                self.metrics_collector.record_import_row("skipped");
            }
            error!(
                "Import aborted after {} rows; {} rows not processed",
                report.imported + report.failed(),
                report.skipped
            );
        }

        let (imported, rejected) = (report.imported as u64, report.failed() as u64);
        self.update_stats(|stats| {
            stats.rows_imported += imported;
            stats.rows_rejected += rejected;
        });

        let duration = timer.stop();
        self.metrics_collector
            .record_operation_duration("import", duration);
        info!(
            "Import finished in {:.3}ms: {} imported, {} rejected",
            as_millis(duration),
            report.imported,
            report.failed()
        );
        report
    }

    /// Read a CSV upload and import its rows
    pub async fn import_csv<R: Read>(&self, reader: R, options: &ImportOptions) -> ImportReport {
        let records = read_records(reader, options);
        debug!("Read {} CSV records", records.len());
        self.import_rows(records, options.stop_on_error).await
    }

    async fn import_record(&self, record: &CsvRecord) -> Result<Game> {
        let row = GameRow::from_fields(&record.fields)?;
        self.create_game(
            &row.first_team,
            row.first_team_score,
            &row.second_team,
            row.second_team_score,
        )
        .await
    }

    /// Stored team, or a fresh one for a name seen for the first time
    fn resolve_team(&self, name: &str) -> Result<Team> {
        match self.store.get_team(name)? {
            Some(team) => Ok(team),
            None => {
                debug!("Team '{}' not found, creating it", name);
                Team::new(name)
            }
        }
    }

    fn require_team(&self, name: &str) -> Result<Team> {
        self.store.get_team(name)?.ok_or_else(|| {
            LeagueError::TeamNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    fn require_game(&self, game_id: &GameId) -> Result<Game> {
        self.store
            .get_game(game_id)?
            .ok_or_else(|| LeagueError::GameNotFound { game_id: *game_id }.into())
    }

    fn update_stats(&self, update: impl FnOnce(&mut LeagueManagerStats)) {
        match self.stats.write() {
            Ok(mut stats) => update(&mut *stats),
            Err(_) => warn!("Failed to acquire stats lock"),
        }
    }

    /// Record metrics and logs for a finished operation
    fn observe<T>(&self, operation: &str, timer: MetricsTimer, result: &Result<T>) {
        let duration = timer.stop();
        match result {
            Ok(_) => {
                if GAME_OPERATIONS.contains(&operation) {
                    self.metrics_collector
                        .record_game_operation(operation, duration);
                } else {
                    self.metrics_collector
                        .record_operation_duration(operation, duration);
                }
                self.refresh_size_gauges();
                debug!("{} finished in {:.3}ms", operation, as_millis(duration));
            }
            Err(e) => {
                self.metrics_collector.record_operation_error(operation);
                self.metrics_collector
                    .record_operation_duration(operation, duration);
                self.update_stats(|stats| stats.failed_operations += 1);
                match league_error(e) {
                    Some(typed) if typed.is_validation() || typed.kind() == "not_found" => {
                        warn!("{} rejected: {}", operation, e)
                    }
                    _ => error!("{} failed: {:#}", operation, e),
                }
            }
        }
    }

    fn refresh_size_gauges(&self) {
        if let (Ok(teams), Ok(games)) = (self.store.team_count(), self.store.game_count()) {
            self.metrics_collector.update_league_size(teams, games);
        }
    }
}
