//! Hybrid score primitives
//!
//! The final score of a candidate product blends four signals:
//!
//! ```text
//! score = 0.35 * category_affinity
//!       + 0.25 * squash(trending)
//!       + 0.10 * proximity
//!       + 0.30 * cf_similarity
//! ```
//!
//! where trending = ln(1 + daily_views) + ln(1 + weekly_sales), squash maps
//! any non-negative signal into [0, 1), and proximity halves every
//! `PROXIMITY_SCALE_KM` away from the shopper.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Default weight of the category affinity signal
pub const CATEGORY_WEIGHT: f64 = 0.35;
/// Default weight of the squashed trending signal
pub const TRENDING_WEIGHT: f64 = 0.25;
/// Default weight of the shop proximity signal
pub const PROXIMITY_WEIGHT: f64 = 0.10;
/// Default weight of the collaborative filtering signal
pub const CF_WEIGHT: f64 = 0.30;

/// Distance in kilometres at which proximity decays to one half
pub const PROXIMITY_SCALE_KM: f64 = 0.5;

/// Blend weights with adjustable values
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoringWeights {
    pub category_weight: f64,
    pub trending_weight: f64,
    pub proximity_weight: f64,
    pub cf_weight: f64,
}

impl ScoringWeights {
    /// Validate that weights sum to 1.0 (with small tolerance for floating point)
    pub fn validate(&self) -> Result<()> {
        let sum = self.category_weight
            + self.trending_weight
            + self.proximity_weight
            + self.cf_weight;

        const EPSILON: f64 = 0.0001;
        if (sum - 1.0).abs() > EPSILON {
            return Err(anyhow::anyhow!("Weights must sum to 1.0, got {:.4}", sum));
        }

        if self.category_weight < 0.0
            || self.trending_weight < 0.0
            || self.proximity_weight < 0.0
            || self.cf_weight < 0.0
        {
            return Err(anyhow::anyhow!("All weights must be non-negative"));
        }

        Ok(())
    }

    /// Weighted sum of the four signals
    pub fn blend(&self, category: f64, squashed_trending: f64, proximity: f64, cf: f64) -> f64 {
        self.category_weight * category
            + self.trending_weight * squashed_trending
            + self.proximity_weight * proximity
            + self.cf_weight * cf
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            category_weight: CATEGORY_WEIGHT,
            trending_weight: TRENDING_WEIGHT,
            proximity_weight: PROXIMITY_WEIGHT,
            cf_weight: CF_WEIGHT,
        }
    }
}

/// Raw trending signal from fresh popularity counters
pub fn trending_score(daily_views: i64, weekly_sales: i64) -> f64 {
    (daily_views as f64).ln_1p() + (weekly_sales as f64).ln_1p()
}

/// Map an unbounded non-negative signal into [0, 1)
pub fn squash(signal: f64) -> f64 {
    signal / (1.0 + signal)
}

/// Proximity factor in (0, 1]; 1.0 at the shop door
pub fn proximity_factor(distance_km: f64) -> f64 {
    1.0 / (1.0 + distance_km / PROXIMITY_SCALE_KM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_validate() {
        assert!(ScoringWeights::default().validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let weights = ScoringWeights {
            category_weight: 0.5,
            trending_weight: 0.5,
            proximity_weight: 0.5,
            cf_weight: 0.5,
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = ScoringWeights {
            category_weight: 1.2,
            trending_weight: -0.2,
            proximity_weight: 0.0,
            cf_weight: 0.0,
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_trending_score_of_dead_product_is_zero() {
        assert_eq!(trending_score(0, 0), 0.0);
    }

    #[test]
    fn test_trending_grows_with_popularity() {
        assert!(trending_score(10, 5) < trending_score(100, 5));
        assert!(trending_score(10, 5) < trending_score(10, 50));
    }

    #[test]
    fn test_squash_stays_below_one() {
        assert_eq!(squash(0.0), 0.0);
        assert!(squash(1.0) == 0.5);
        assert!(squash(1000.0) < 1.0);
        assert!(squash(2.0) > squash(1.0));
    }

    #[test]
    fn test_proximity_is_one_at_the_door() {
        assert_eq!(proximity_factor(0.0), 1.0);
    }

    #[test]
    fn test_proximity_halves_at_scale_distance() {
        assert!((proximity_factor(PROXIMITY_SCALE_KM) - 0.5).abs() < 1e-12);
        assert!(proximity_factor(2.0) < proximity_factor(1.0));
    }

    #[test]
    fn test_blend_applies_weights() {
        let weights = ScoringWeights::default();
        let score = weights.blend(1.0, 0.0, 0.0, 0.0);
        assert!((score - CATEGORY_WEIGHT).abs() < 1e-12);

        let full = weights.blend(1.0, 1.0, 1.0, 1.0);
        assert!((full - 1.0).abs() < 1e-12);
    }
}
