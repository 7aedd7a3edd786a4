//! Waypoint snap candidates and combination enumeration
//!
//! A waypoint's nearest vertex can sit on a disconnected scrap of the
//! network, so the router keeps several candidates per waypoint and tries
//! combinations of them, closest-first, until one yields a fully connected
//! route.

use geo::Point;
use petgraph::graph::NodeIndex;

use crate::model::RoadModel;

/// Ranks up to `k` snap candidates for a waypoint by straight-line
/// distance, closest first.
pub fn rank_candidates(model: &RoadModel, waypoint: Point<f64>, k: usize) -> Vec<NodeIndex> {
    model.nearest_vertices(waypoint, k)
}

/// Enumerates candidate index combinations in mixed-radix order, bounded
/// by `cap`.
///
/// Combination `i` maps to digits `(i % c0, i / c0 % c1, ...)`, so low
/// indices - and therefore closer candidates - are exhausted first. An
/// empty candidate list for any waypoint yields no combinations.
pub fn combinations(counts: &[usize], cap: usize) -> Vec<Vec<usize>> {
    let total = counts
        .iter()
        .try_fold(1usize, |acc, &c| acc.checked_mul(c))
        .unwrap_or(usize::MAX);
    let bounded = total.min(cap);

    (0..bounded)
        .map(|i| {
            let mut temp = i;
            counts
                .iter()
                .map(|&count| {
                    let digit = temp % count;
                    temp /= count;
                    digit
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_combination_uses_the_closest_candidates() {
        let combos = combinations(&[3, 3], 50);
        assert_eq!(combos[0], vec![0, 0]);
        assert_eq!(combos[1], vec![1, 0]);
    }

    #[test]
    fn enumerates_the_full_space_when_under_the_cap() {
        let combos = combinations(&[2, 3], 50);
        assert_eq!(combos.len(), 6);
        let mut seen = combos.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn cap_bounds_the_enumeration() {
        let combos = combinations(&[5, 5, 5], 50);
        assert_eq!(combos.len(), 50);
    }

    #[test]
    fn empty_candidate_list_yields_nothing() {
        assert!(combinations(&[3, 0, 3], 50).is_empty());
    }

    #[test]
    fn digits_stay_within_their_radix() {
        for combo in combinations(&[2, 4], 50) {
            assert!(combo[0] < 2);
            assert!(combo[1] < 4);
        }
    }
}
