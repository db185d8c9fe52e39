use feat2d_core::{DescriptorFamily, FeatureConfig, Match, MatcherKind, SelectorKind};
use feat2d_filter::filter_by_distance_ratio;
use log::{debug, warn};
use opencv::core::{DMatch, Mat, Vector, NORM_HAMMING, NORM_L2};
use opencv::features2d::{BFMatcher, FlannBasedMatcher};
use opencv::prelude::*;

use crate::convert::{from_dmatches, from_knn_dmatches};
use crate::descriptor::Descriptors;
use crate::error::CvResult;

/// Match every `source` descriptor against the `reference` set.
///
/// `Match::query_idx` indexes `source`, `Match::train_idx` indexes
/// `reference`. Either side empty yields no matches.
pub fn match_descriptors(
    source: &Descriptors,
    reference: &Descriptors,
    family: DescriptorFamily,
    cfg: &FeatureConfig,
) -> CvResult<Vec<Match>> {
    if source.is_empty() || reference.is_empty() {
        warn!(
            "skipping match: {} source and {} reference descriptors",
            source.len(),
            reference.len()
        );
        return Ok(Vec::new());
    }

    let matches = match cfg.matcher {
        MatcherKind::BruteForce => {
            let norm = match family {
                DescriptorFamily::Binary => NORM_HAMMING,
                DescriptorFamily::Hog => NORM_L2,
            };
            let matcher = BFMatcher::create(norm, cfg.matching.cross_check)?;
            select_matches(&matcher, source.as_mat(), reference.as_mat(), cfg)?
        }
        MatcherKind::Flann => {
            // FLANN's default KD-tree index only accepts float rows
            let query = source.to_f32()?;
            let train = reference.to_f32()?;
            let matcher = FlannBasedMatcher::create()?;
            select_matches(&matcher, &query, &train, cfg)?
        }
    };

    debug!(
        "{}/{} matched {} of {} descriptors",
        cfg.matcher,
        cfg.selector,
        matches.len(),
        source.len()
    );
    Ok(matches)
}

fn select_matches<M: DescriptorMatcherTraitConst>(
    matcher: &M,
    query: &Mat,
    train: &Mat,
    cfg: &FeatureConfig,
) -> CvResult<Vec<Match>> {
    match cfg.selector {
        SelectorKind::NearestNeighbor => {
            let mut matches = Vector::<DMatch>::new();
            matcher.train_match(query, train, &mut matches, &Mat::default())?;
            Ok(from_dmatches(&matches))
        }
        SelectorKind::KNearestNeighbors => {
            let mut knn = Vector::<Vector<DMatch>>::new();
            matcher.knn_train_match(
                query,
                train,
                &mut knn,
                i32::try_from(cfg.matching.k).unwrap_or(i32::MAX),
                &Mat::default(),
                false,
            )?;
            Ok(filter_by_distance_ratio(
                &from_knn_dmatches(&knn),
                cfg.matching.max_ratio,
            ))
        }
    }
}
