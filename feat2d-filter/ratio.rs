use feat2d_core::{KnnMatches, Match};
use log::debug;
use rayon::prelude::*;

use crate::error::{FilterError, FilterResult};

/// Distance-ratio test on the candidates of one query descriptor.
///
/// With two or more candidates the nearest one is accepted only when
/// `nearest / second <= max_ratio`. A lone candidate is accepted as is.
/// Equal zero distances give a NaN ratio and are rejected as ambiguous.
pub fn select_by_ratio(candidates: &[Match], max_ratio: f32) -> Option<Match> {
    match candidates {
        [] => None,
        [only] => Some(*only),
        [best, second, ..] => {
            let ratio = best.distance / second.distance;
            (ratio <= max_ratio).then_some(*best)
        }
    }
}

/// Apply [`select_by_ratio`] to every query, keeping query order.
pub fn filter_by_distance_ratio(knn: &[KnnMatches], max_ratio: f32) -> Vec<Match> {
    let kept: Vec<Match> = knn
        .par_iter()
        .filter_map(|candidates| select_by_ratio(candidates, max_ratio))
        .collect();
    debug!(
        "distance ratio {:.2} kept {} of {} queries",
        max_ratio,
        kept.len(),
        knn.len()
    );
    kept
}

/// Distance-ratio filter with a validated threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioFilter {
    max_ratio: f32,
}

impl RatioFilter {
    pub fn new(max_ratio: f32) -> FilterResult<Self> {
        if max_ratio > 0.0 && max_ratio <= 1.0 {
            Ok(Self { max_ratio })
        } else {
            Err(FilterError::InvalidRatio(max_ratio))
        }
    }

    pub fn max_ratio(&self) -> f32 {
        self.max_ratio
    }

    pub fn apply(&self, knn: &[KnnMatches]) -> Vec<Match> {
        filter_by_distance_ratio(knn, self.max_ratio)
    }
}

impl Default for RatioFilter {
    fn default() -> Self {
        Self { max_ratio: 0.8 }
    }
}
