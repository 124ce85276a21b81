//! Points policy trait and the standard implementation
//!
//! A points policy turns a game outcome into counter changes on the two
//! participating teams and turns a team's counters into ranking points.

use crate::error::Result;
use crate::league::{Game, Team};

/// Trait for scoring rules
///
/// `apply` and `reverse` must be called in matched pairs for a given
/// version of a game's scores. The policy itself cannot tell whether a
/// game was already applied; the league manager owns that guarantee.
#[cfg_attr(test, mockall::automock)]
pub trait PointsPolicy: Send + Sync {
    /// Short identifier used in logs and configuration
    fn name(&self) -> &'static str;

    /// Ranking points for a team, computed from its counters only
    fn compute_score(&self, team: &Team) -> u32;

    /// Credit one game result to both teams and refresh their points
    ///
    /// # Arguments
    /// * `game` - The game whose outcome is applied
    /// * `first` - The game's first team
    /// * `second` - The game's second team
    fn apply(&self, game: &Game, first: &mut Team, second: &mut Team) -> Result<()> {
        let (first_counter, second_counter) = game.outcome().counters();
        first.record(first_counter)?;
        second.record(second_counter)?;
        first.refresh_points(self);
        second.refresh_points(self);
        Ok(())
    }

    /// Exact inverse of `apply` for the same game scores
    fn reverse(&self, game: &Game, first: &mut Team, second: &mut Team) -> Result<()> {
        let (first_counter, second_counter) = game.outcome().counters();
        first.retract(first_counter)?;
        second.retract(second_counter)?;
        first.refresh_points(self);
        second.refresh_points(self);
        Ok(())
    }
}

/// Three points for a win, one for a draw, none for a loss
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPointsPolicy;

impl StandardPointsPolicy {
    pub const WIN_POINTS: u32 = 3;
    pub const DRAW_POINTS: u32 = 1;
    pub const LOSS_POINTS: u32 = 0;
}

impl PointsPolicy for StandardPointsPolicy {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn compute_score(&self, team: &Team) -> u32 {
        team.wins()
            .saturating_mul(Self::WIN_POINTS)
            .saturating_add(team.draws().saturating_mul(Self::DRAW_POINTS))
            .saturating_add(team.losses().saturating_mul(Self::LOSS_POINTS))
    }
}
