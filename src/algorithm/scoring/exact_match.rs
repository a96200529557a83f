use crate::error::{ConfigError, ConfigResult};

use super::{DistanceMetric, TScore, PERFECT_SCORE};

/// Equal elements score `PERFECT_SCORE`, everything else a fixed mismatch penalty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExactMatchMetric {
    mismatch: TScore,
}

impl ExactMatchMetric {
    pub fn new(mismatch: TScore) -> ConfigResult<ExactMatchMetric> {
        if !mismatch.is_finite() || mismatch > 0.0 {
            return Err(ConfigError::InvalidMismatch(mismatch));
        }
        Ok(ExactMatchMetric { mismatch })
    }
}

impl Default for ExactMatchMetric {
    fn default() -> Self {
        ExactMatchMetric { mismatch: -1.0 }
    }
}

impl<T: PartialEq> DistanceMetric<T> for ExactMatchMetric {
    fn score(&self, a: &T, b: &T) -> TScore {
        if a == b {
            PERFECT_SCORE
        } else {
            self.mismatch
        }
    }
}
