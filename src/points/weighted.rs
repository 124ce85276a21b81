//! Configurable points weighting
//!
//! Same counter semantics as the standard policy, with the points awarded
//! per win, draw and loss taken from configuration (for example the older
//! two-points-for-a-win scheme).

use crate::error::{LeagueError, Result};
use crate::league::Team;
use crate::points::policy::PointsPolicy;
use serde::{Deserialize, Serialize};

/// Points awarded per result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsWeights {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

impl Default for PointsWeights {
    fn default() -> Self {
        Self {
            win: 3,
            draw: 1,
            loss: 0,
        }
    }
}

impl PointsWeights {
    /// Two points for a win, one for a draw
    pub fn two_for_a_win() -> Self {
        Self {
            win: 2,
            draw: 1,
            loss: 0,
        }
    }

    /// A win must be worth more than a draw, and a draw at least a loss
    pub fn validate(&self) -> Result<()> {
        if self.win <= self.draw {
            return Err(LeagueError::Configuration {
                message: format!(
                    "win points ({}) must be greater than draw points ({})",
                    self.win, self.draw
                ),
            }
            .into());
        }
        if self.draw < self.loss {
            return Err(LeagueError::Configuration {
                message: format!(
                    "draw points ({}) must not be less than loss points ({})",
                    self.draw, self.loss
                ),
            }
            .into());
        }
        Ok(())
    }
}

/// Points policy with custom per-result weights
#[derive(Debug, Clone)]
pub struct WeightedPointsPolicy {
    weights: PointsWeights,
}

impl WeightedPointsPolicy {
    pub fn new(weights: PointsWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> PointsWeights {
        self.weights
    }
}

impl PointsPolicy for WeightedPointsPolicy {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn compute_score(&self, team: &Team) -> u32 {
        team.wins()
            .saturating_mul(self.weights.win)
            .saturating_add(team.draws().saturating_mul(self.weights.draw))
            .saturating_add(team.losses().saturating_mul(self.weights.loss))
    }
}
