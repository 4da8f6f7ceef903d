//! Consolidation of detected runs into highlight regions.
//!
//! Run rules report one window per triggering point, so a sustained signal
//! produces many overlapping windows. [`merge_paths`] folds overlapping and
//! index-adjacent windows into one [`MergedPath`] each.

use std::collections::BTreeMap;

use tracing::trace;

use super::chart::{MergedPath, PathPoint, Run};

/// Merge runs that overlap or touch into contiguous paths.
///
/// `runs` must be ordered by starting index, which is how the run rules emit
/// them. Adjacent pairs are scanned front to back; when a pair shares an
/// index, or the second starts right after the first ends, the pair is
/// replaced by its union and the scan restarts. The loop stops once a full
/// scan merges nothing. Worst case is quadratic in the number of runs.
///
/// Tags are dropped: merged paths carry only `(index, value)` pairs, sorted by
/// index with duplicates removed. Empty runs are ignored.
///
/// # Examples
///
/// ```
/// use spc_xmr::spc::{merge_paths, Run, SignalPoint};
///
/// let run = |i: usize| Run {
///     points: vec![SignalPoint { index: i, value: 1.0, tag: None }],
/// };
///
/// assert_eq!(merge_paths(vec![run(0), run(1)]).len(), 1);
/// assert_eq!(merge_paths(vec![run(0), run(5)]).len(), 2);
/// ```
pub fn merge_paths(runs: Vec<Run>) -> Vec<MergedPath> {
    let mut paths: Vec<BTreeMap<usize, f64>> = runs
        .into_iter()
        .filter(|r| !r.points.is_empty())
        .map(|r| r.points.into_iter().map(|p| (p.index, p.value)).collect())
        .collect();

    loop {
        let Some(i) =
            (0..paths.len().saturating_sub(1)).find(|&i| touches(&paths[i], &paths[i + 1]))
        else {
            break;
        };
        let next = paths.remove(i + 1);
        trace!(
            at = i,
            remaining = paths.len(),
            "merging overlapping run windows"
        );
        paths[i].extend(next);
    }

    paths
        .into_iter()
        .map(|p| MergedPath {
            points: p
                .into_iter()
                .map(|(index, value)| PathPoint { index, value })
                .collect(),
        })
        .collect()
}

/// Whether `next` shares an index with `current` or starts right after it.
fn touches(current: &BTreeMap<usize, f64>, next: &BTreeMap<usize, f64>) -> bool {
    let (Some((&last, _)), Some((&first, _))) =
        (current.last_key_value(), next.first_key_value())
    else {
        return false;
    };
    first == last + 1 || next.keys().any(|k| current.contains_key(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spc::chart::{SignalPoint, SignalTag};

    fn run(indices: &[usize]) -> Run {
        Run {
            points: indices
                .iter()
                .map(|&i| SignalPoint {
                    index: i,
                    value: i as f64 * 10.0,
                    tag: Some(SignalTag::High),
                })
                .collect(),
        }
    }

    fn indices(path: &MergedPath) -> Vec<usize> {
        path.points.iter().map(|p| p.index).collect()
    }

    #[test]
    fn test_adjacent_runs_merge() {
        let single = |i| Run {
            points: vec![SignalPoint {
                index: i,
                value: 1.0,
                tag: None,
            }],
        };
        let merged = merge_paths(vec![single(0), single(1)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].points,
            vec![
                PathPoint {
                    index: 0,
                    value: 1.0
                },
                PathPoint {
                    index: 1,
                    value: 1.0
                },
            ]
        );
    }

    #[test]
    fn test_disjoint_runs_stay_separate() {
        let merged = merge_paths(vec![run(&[0]), run(&[5])]);
        assert_eq!(merged.len(), 2);
        assert_eq!(indices(&merged[0]), vec![0]);
        assert_eq!(indices(&merged[1]), vec![5]);
    }

    #[test]
    fn test_overlapping_windows_dedup() {
        let merged = merge_paths(vec![run(&[0, 1, 2, 3]), run(&[1, 2, 3, 4]), run(&[2, 3, 4, 5])]);
        assert_eq!(merged.len(), 1);
        assert_eq!(indices(&merged[0]), vec![0, 1, 2, 3, 4, 5]);
        assert!((merged[0].points[5].value - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_chain_then_gap() {
        let merged = merge_paths(vec![
            run(&[0, 1, 2, 3]),
            run(&[1, 2, 3, 4]),
            run(&[10, 11, 12, 13]),
            run(&[14, 15, 16, 17]),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(indices(&merged[0]), vec![0, 1, 2, 3, 4]);
        assert_eq!(indices(&merged[1]), (10..=17).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_paths(Vec::new()).is_empty());
    }

    #[test]
    fn test_empty_runs_ignored() {
        let merged = merge_paths(vec![Run { points: Vec::new() }, run(&[3])]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_gap_of_one_index_not_merged() {
        let merged = merge_paths(vec![run(&[0, 1]), run(&[3, 4])]);
        assert_eq!(merged.len(), 2);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::spc::chart::SignalPoint;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn merged_paths_disjoint_and_separated(
            starts in proptest::collection::vec(0_usize..200, 0..=30),
            width in 1_usize..=8,
        ) {
            let mut starts = starts;
            starts.sort_unstable();
            let runs: Vec<Run> = starts
                .iter()
                .map(|&s| Run {
                    points: (s..s + width)
                        .map(|i| SignalPoint { index: i, value: i as f64, tag: None })
                        .collect(),
                })
                .collect();

            let merged = merge_paths(runs);
            for path in &merged {
                for w in path.points.windows(2) {
                    prop_assert!(w[0].index < w[1].index);
                }
            }
            for pair in merged.windows(2) {
                let last = pair[0].last_index().expect("non-empty");
                let first = pair[1].first_index().expect("non-empty");
                prop_assert!(first > last + 1, "paths {last} and {first} touch");
            }
        }
    }
}
