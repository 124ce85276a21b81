//! Points scheme configuration

use crate::points::PointsWeights;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Which points policy the league runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointsScheme {
    /// 3 / 1 / 0
    Standard,
    /// Weights taken from `PointsSettings`
    Weighted,
}

impl std::str::FromStr for PointsScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(PointsScheme::Standard),
            "weighted" => Ok(PointsScheme::Weighted),
            other => Err(anyhow!("Unknown points scheme: {}", other)),
        }
    }
}

impl std::fmt::Display for PointsScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointsScheme::Standard => write!(f, "standard"),
            PointsScheme::Weighted => write!(f, "weighted"),
        }
    }
}

/// Points policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsSettings {
    pub scheme: PointsScheme,
    /// Points per win (weighted scheme only)
    pub win_points: u32,
    /// Points per draw (weighted scheme only)
    pub draw_points: u32,
    /// Points per loss (weighted scheme only)
    pub loss_points: u32,
}

impl Default for PointsSettings {
    fn default() -> Self {
        Self {
            scheme: PointsScheme::Standard,
            win_points: 3,
            draw_points: 1,
            loss_points: 0,
        }
    }
}

impl PointsSettings {
    pub fn weights(&self) -> PointsWeights {
        PointsWeights {
            win: self.win_points,
            draw: self.draw_points,
            loss: self.loss_points,
        }
    }
}
