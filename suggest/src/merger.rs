//! Solvers of the threshold-occurrence problem.
//!
//! Given `m` ascending posting lists and a threshold `t`, a merger emits every
//! id found in at least `t` lists together with its overlap, the number of
//! lists containing it. Candidates are handed to a [`Collector`] as they are
//! found; a collector returning [`CollectionTerminated`] stops the merge
//! early.
mod candidate;
mod collector;
mod cp_merge;
mod divide_skip;
mod intersector;
mod merge_skip;
mod scan_count;

pub use candidate::Candidate;
pub use collector::{CollectionTerminated, Collector, FirstKCollector, VecCollector};
pub use cp_merge::CpMerge;
pub use divide_skip::DivideSkip;
pub use intersector::Intersector;
pub use merge_skip::MergeSkip;
pub use scan_count::ScanCount;

use crate::posting::PostingList;

/// A solver of the threshold-occurrence problem.
pub trait ListMerger {
    /// Emits every id present in at least `threshold` of `lists`.
    ///
    /// The iterators are consumed. Nothing is emitted when `threshold` is zero
    /// or exceeds the number of lists.
    fn merge<P>(&self, lists: &mut [P], threshold: usize, collector: &mut dyn Collector)
    where
        P: PostingList;
}

/// The merger to run, chosen at configuration time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MergerKind {
    /// [`ScanCount`].
    ScanCount,

    /// [`CpMerge`].
    CpMerge,

    /// [`MergeSkip`].
    MergeSkip,

    /// [`DivideSkip`] with the given `μ`.
    DivideSkip(f64),
}

impl Default for MergerKind {
    fn default() -> Self {
        Self::CpMerge
    }
}

impl ListMerger for MergerKind {
    fn merge<P>(&self, lists: &mut [P], threshold: usize, collector: &mut dyn Collector)
    where
        P: PostingList,
    {
        match *self {
            Self::ScanCount => ScanCount.merge(lists, threshold, collector),
            Self::CpMerge => CpMerge.merge(lists, threshold, collector),
            Self::MergeSkip => MergeSkip.merge(lists, threshold, collector),
            Self::DivideSkip(mu) => DivideSkip::new(mu).merge(lists, threshold, collector),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::collection::{btree_set, vec};
    use proptest::prelude::*;

    use crate::posting::SliceIterator;

    fn run<M>(merger: &M, lists: &[Vec<u32>], threshold: usize) -> Vec<(u32, usize)>
    where
        M: ListMerger,
    {
        let mut iters: Vec<_> = lists.iter().cloned().map(SliceIterator::new).collect();
        let mut collector = VecCollector::default();
        merger.merge(&mut iters, threshold, &mut collector);
        let mut result: Vec<_> = collector
            .into_inner()
            .into_iter()
            .map(|c| (c.position(), c.overlap()))
            .collect();
        result.sort_unstable();
        result
    }

    fn mergers() -> Vec<MergerKind> {
        vec![
            MergerKind::ScanCount,
            MergerKind::CpMerge,
            MergerKind::MergeSkip,
            MergerKind::DivideSkip(0.01),
            MergerKind::DivideSkip(1.0),
        ]
    }

    #[test]
    fn test_scenario() {
        let lists = vec![vec![1, 2, 3], vec![1, 2], vec![2, 3], vec![2]];
        for merger in mergers() {
            assert_eq!(
                run(&merger, &lists, 2),
                vec![(1, 2), (2, 4), (3, 2)],
                "{merger:?}"
            );
        }
    }

    #[test]
    fn test_threshold_one_is_union() {
        let lists = vec![vec![1, 5], vec![2, 5], vec![]];
        for merger in mergers() {
            assert_eq!(
                run(&merger, &lists, 1),
                vec![(1, 1), (2, 1), (5, 2)],
                "{merger:?}"
            );
        }
    }

    #[test]
    fn test_threshold_all_is_intersection() {
        let lists = vec![vec![1, 3, 5, 7], vec![3, 4, 5], vec![0, 3, 5, 9]];
        for merger in mergers() {
            assert_eq!(run(&merger, &lists, 3), vec![(3, 3), (5, 3)], "{merger:?}");
        }
    }

    #[test]
    fn test_unreachable_threshold() {
        let lists = vec![vec![1, 2], vec![1, 2]];
        for merger in mergers() {
            assert!(run(&merger, &lists, 3).is_empty(), "{merger:?}");
            assert!(run(&merger, &lists, 0).is_empty(), "{merger:?}");
            assert!(run(&merger, &[], 1).is_empty(), "{merger:?}");
        }
    }

    #[test]
    fn test_long_lists() {
        let lists = vec![
            (0..500).map(|i| i * 2).collect::<Vec<_>>(),
            (0..400).map(|i| i * 3).collect(),
            (0..300).map(|i| i * 5).collect(),
            vec![30, 60, 90, 997],
        ];
        let expected = run(&MergerKind::ScanCount, &lists, 2);
        assert!(expected.contains(&(30, 4)));
        for merger in mergers() {
            assert_eq!(run(&merger, &lists, 2), expected, "{merger:?}");
        }
    }

    #[test]
    fn test_early_termination() {
        let lists = vec![vec![1, 2, 3, 4], vec![1, 2, 3, 4]];
        for merger in mergers() {
            let mut iters: Vec<_> = lists.iter().cloned().map(SliceIterator::new).collect();
            let mut collector = FirstKCollector::new(2);
            merger.merge(&mut iters, 2, &mut collector);
            assert_eq!(collector.into_inner().len(), 2, "{merger:?}");
        }
    }

    proptest! {
        #[test]
        fn mergers_agree(
            sets in vec(btree_set(0u32..200, 0..120), 1..7),
            threshold in 1usize..7,
        ) {
            let lists: Vec<Vec<u32>> = sets.into_iter().map(|s| s.into_iter().collect()).collect();
            let expected = run(&MergerKind::ScanCount, &lists, threshold);
            for &(_, overlap) in &expected {
                prop_assert!(overlap >= threshold);
            }
            for merger in mergers() {
                prop_assert_eq!(&run(&merger, &lists, threshold), &expected);
            }
        }
    }
}
