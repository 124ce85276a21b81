//! Points policies
//!
//! This module provides the pluggable scoring rules that convert game
//! outcomes into team counter changes and counters into ranking points.

pub mod policy;
pub mod weighted;

pub use policy::{PointsPolicy, StandardPointsPolicy};
pub use weighted::{PointsWeights, WeightedPointsPolicy};

#[cfg(test)]
pub use policy::MockPointsPolicy;

use crate::config::{PointsScheme, PointsSettings};
use crate::error::Result;
use std::sync::Arc;

/// Build the active points policy from configuration
pub fn build_policy(settings: &PointsSettings) -> Result<Arc<dyn PointsPolicy>> {
    match settings.scheme {
        PointsScheme::Standard => Ok(Arc::new(StandardPointsPolicy)),
        PointsScheme::Weighted => Ok(Arc::new(WeightedPointsPolicy::new(settings.weights())?)),
    }
}
