use feat2d_core::Keypoint;
use log::debug;

/// Overlap-based non-maximum suppression.
///
/// Each round seeds a local maximum with the first remaining candidate and
/// sweeps the rest in order: candidates whose circle overlaps the current
/// maximum are its neighbours and either replace it (strictly higher
/// response) or are dropped; the others wait for the next round. The
/// maximum of every round is emitted, in round order.
///
/// Later neighbours are tested against the maximum as it stands at that
/// point of the sweep, so the order of `candidates` matters.
pub fn suppress_overlapping(candidates: &[Keypoint]) -> Vec<Keypoint> {
    let mut survivors = Vec::new();
    let mut remaining = candidates.to_vec();

    loop {
        let Some((&first, rest)) = remaining.split_first() else {
            break;
        };

        let mut strongest = first;
        let mut next_round = Vec::with_capacity(rest.len());
        for &candidate in rest {
            if strongest.overlap(&candidate) > 0.0 {
                if candidate.response > strongest.response {
                    strongest = candidate;
                }
            } else {
                next_round.push(candidate);
            }
        }

        survivors.push(strongest);
        remaining = next_round;
    }

    debug!(
        "overlap NMS kept {} of {} candidates",
        survivors.len(),
        candidates.len()
    );
    survivors
}

/// Run [`suppress_overlapping`] when `enabled`, otherwise pass the candidates through.
pub fn apply_nms(candidates: Vec<Keypoint>, enabled: bool) -> Vec<Keypoint> {
    if enabled {
        suppress_overlapping(&candidates)
    } else {
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kp(x: f32, y: f32, response: f32) -> Keypoint {
        Keypoint::new(x, y, 6.0).with_response(response)
    }

    #[test]
    fn test_empty_input() {
        assert!(suppress_overlapping(&[]).is_empty());
    }

    #[test]
    fn test_single_candidate() {
        let out = suppress_overlapping(&[kp(1.0, 1.0, 10.0)]);
        assert_eq!(out, vec![kp(1.0, 1.0, 10.0)]);
    }

    #[test]
    fn test_cluster_collapses_to_strongest() {
        let cluster = [kp(10.0, 10.0, 120.0), kp(11.0, 10.0, 180.0), kp(10.0, 11.0, 150.0)];
        let out = suppress_overlapping(&cluster);
        assert_eq!(out, vec![kp(11.0, 10.0, 180.0)]);
    }

    #[test]
    fn test_disjoint_candidates_pass_unchanged() {
        let spread = [kp(0.0, 0.0, 1.0), kp(20.0, 0.0, 5.0), kp(40.0, 0.0, 3.0)];
        assert_eq!(suppress_overlapping(&spread), spread.to_vec());
    }

    #[test]
    fn test_two_clusters_in_round_order() {
        let candidates = [
            kp(0.0, 0.0, 110.0),
            kp(50.0, 50.0, 200.0),
            kp(1.0, 0.0, 130.0),
            kp(51.0, 50.0, 190.0),
        ];
        let out = suppress_overlapping(&candidates);
        assert_eq!(out, vec![kp(1.0, 0.0, 130.0), kp(50.0, 50.0, 200.0)]);
    }

    #[test]
    fn test_equal_response_keeps_first() {
        let out = suppress_overlapping(&[kp(5.0, 5.0, 100.0), kp(6.0, 5.0, 100.0)]);
        assert_eq!(out, vec![kp(5.0, 5.0, 100.0)]);
    }

    #[test]
    fn test_neighbour_test_follows_moving_maximum() {
        // c overlaps b but not a; once b takes over, c is b's neighbour and is dropped
        let a = kp(0.0, 0.0, 100.0);
        let b = kp(5.0, 0.0, 150.0);
        let c = kp(10.0, 0.0, 120.0);
        assert_eq!(suppress_overlapping(&[a, b, c]), vec![b]);
    }

    #[test]
    fn test_large_candidate_set_does_not_recurse() {
        // every candidate is isolated, one round per candidate
        let grid: Vec<Keypoint> = (0..5_000)
            .map(|i| kp((i % 100) as f32 * 10.0, (i / 100) as f32 * 10.0, i as f32))
            .collect();
        assert_eq!(suppress_overlapping(&grid).len(), grid.len());
    }

    #[test]
    fn test_disabled_passes_through() {
        let cluster = vec![kp(10.0, 10.0, 120.0), kp(11.0, 10.0, 180.0)];
        assert_eq!(apply_nms(cluster.clone(), false), cluster);
        assert_eq!(apply_nms(cluster, true).len(), 1);
    }

    fn candidates() -> impl Strategy<Value = Vec<Keypoint>> {
        prop::collection::vec((0.0f32..64.0, 0.0f32..64.0, 0.0f32..255.0), 0..120)
            .prop_map(|v| v.into_iter().map(|(x, y, r)| kp(x, y, r)).collect())
    }

    proptest! {
        #[test]
        fn prop_output_is_subset(input in candidates()) {
            let out = suppress_overlapping(&input);
            prop_assert!(out.len() <= input.len());
            prop_assert_eq!(out.is_empty(), input.is_empty());
            for k in &out {
                prop_assert!(input.contains(k));
            }
        }

        #[test]
        fn prop_strongest_survives(input in candidates()) {
            prop_assume!(!input.is_empty());
            let best = input
                .iter()
                .map(|k| k.response)
                .fold(f32::NEG_INFINITY, f32::max);
            let out = suppress_overlapping(&input);
            prop_assert!(out.iter().any(|k| k.response == best));
        }

        #[test]
        fn prop_idempotent_on_disjoint_output(input in candidates()) {
            let out = suppress_overlapping(&input);
            let disjoint = out
                .iter()
                .enumerate()
                .all(|(i, a)| out[i + 1..].iter().all(|b| a.overlap(b) <= 0.0));
            if disjoint {
                prop_assert_eq!(suppress_overlapping(&out), out);
            }
        }
    }
}
