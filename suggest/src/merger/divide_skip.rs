use std::cmp::Reverse;

use super::{Collector, ListMerger, MergeSkip, VecCollector};
use crate::posting::PostingList;

/// DivideSkip by Li et al.
///
/// The `ℓ = ⌊t / (μ·ln M + 1)⌋` longest lists are set aside; the others are
/// merged by the inner merger with threshold `t - ℓ`, and each resulting
/// candidate is then probed against the long lists.
#[derive(Debug, Clone, Copy)]
pub struct DivideSkip<M = MergeSkip> {
    mu: f64,
    inner: M,
}

impl DivideSkip {
    /// Creates a merger with [`MergeSkip`] for the short lists.
    pub const fn new(mu: f64) -> Self {
        Self {
            mu,
            inner: MergeSkip,
        }
    }
}

impl<M> DivideSkip<M>
where
    M: ListMerger,
{
    /// Creates a merger with a custom merger for the short lists.
    pub const fn with_inner(mu: f64, inner: M) -> Self {
        Self { mu, inner }
    }

    /// Number of long lists, at most `threshold - 1`.
    fn num_long_lists(&self, threshold: usize, longest: usize) -> usize {
        let longest = longest.max(1) as f64;
        let l = (threshold as f64 / (self.mu * longest.ln() + 1.0)).floor();
        if l.is_finite() && l > 0.0 {
            (l as usize).min(threshold - 1)
        } else {
            0
        }
    }
}

impl<M> ListMerger for DivideSkip<M>
where
    M: ListMerger,
{
    fn merge<P>(&self, lists: &mut [P], threshold: usize, collector: &mut dyn Collector)
    where
        P: PostingList,
    {
        if threshold == 0 || threshold > lists.len() {
            return;
        }
        lists.sort_unstable_by_key(|list| Reverse(list.len()));
        let num_long = self.num_long_lists(threshold, lists[0].len());
        if num_long == 0 {
            self.inner.merge(lists, threshold, collector);
            return;
        }

        let (long, short) = lists.split_at_mut(num_long);
        let mut short_candidates = VecCollector::default();
        self.inner
            .merge(short, threshold - num_long, &mut short_candidates);
        let mut candidates = short_candidates.into_inner();
        candidates.sort_unstable();

        for mut c in candidates {
            for (k, list) in long.iter_mut().enumerate() {
                if c.overlap() + (num_long - k) < threshold {
                    break;
                }
                if list.lower_bound(c.position()) == Ok(c.position()) {
                    c.increment();
                }
            }
            if c.overlap() >= threshold && collector.collect(c).is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_long_lists() {
        let merger = DivideSkip::new(0.01);
        // ln(1000) ≈ 6.9, 10 / 1.069 ≈ 9.35
        assert_eq!(merger.num_long_lists(10, 1000), 9);
        assert_eq!(merger.num_long_lists(1, 1000), 0);
        let merger = DivideSkip::new(1.0);
        // 4 / (ln(100) + 1) ≈ 0.72
        assert_eq!(merger.num_long_lists(4, 100), 0);
        assert_eq!(merger.num_long_lists(12, 100), 2);
    }
}
