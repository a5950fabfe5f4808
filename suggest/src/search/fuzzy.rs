use rayon::prelude::*;

use super::{Ranked, SearchConfig, TopKQueue};
use crate::errors::Result;
use crate::index::InvertedIndices;
use crate::merger::{Candidate, CollectionTerminated, ListMerger, MergerKind};
use crate::tokenizer::NGramTokenizer;

/// Fuzzy search under a set-similarity metric.
///
/// Candidate cardinalities are visited outward from the query cardinality;
/// each bucket `I[b]` is merged with the overlap threshold the metric demands
/// for `b`, tightened by the worst score kept so far once the queue is full.
#[derive(Debug, Clone)]
pub struct FuzzySearcher {
    tokenizer: NGramTokenizer,
    merger: MergerKind,
    parallel: bool,
}

impl FuzzySearcher {
    /// Creates a searcher with [`CpMerge`](crate::merger::CpMerge) and
    /// parallel bucket fan-out.
    pub fn new(tokenizer: NGramTokenizer) -> Self {
        Self {
            tokenizer,
            merger: MergerKind::default(),
            parallel: true,
        }
    }

    /// Sets the merger.
    pub fn merger(mut self, merger: MergerKind) -> Self {
        self.merger = merger;
        self
    }

    /// Enables or disables parallel bucket fan-out.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Gets the tokenizer.
    pub fn tokenizer(&self) -> &NGramTokenizer {
        &self.tokenizer
    }

    /// Searches the indices.
    ///
    /// Returns at most `top_k` documents ordered by score descending, then
    /// by id ascending.
    ///
    /// # Errors
    ///
    /// [`SuggestError`](crate::errors::SuggestError) is returned when a
    /// posting list cannot be decoded.
    pub fn search(&self, indices: &InvertedIndices, config: &SearchConfig) -> Result<Vec<Ranked>> {
        let terms = self.tokenizer.tokenize(config.query());
        if terms.is_empty() {
            return Ok(vec![]);
        }
        let a = terms.len();
        let (metric, alpha) = (config.metric(), config.similarity());
        let b_min = metric.min_y(alpha, a).max(1);
        let b_max = metric.max_y(alpha, a).min(indices.max_cardinality());
        if b_min > b_max {
            return Ok(vec![]);
        }
        let order = expansion_order(a, b_min, b_max);
        tracing::debug!(
            query = config.query(),
            a,
            b_min,
            b_max,
            buckets = order.len(),
            merger = ?self.merger,
            "fuzzy search"
        );

        let bucket = BucketSearch {
            indices,
            terms: &terms,
            config,
            merger: self.merger,
        };
        let queue = if self.parallel && order.len() > 1 {
            order
                .par_iter()
                .try_fold(
                    || TopKQueue::new(config.top_k()),
                    |mut queue, &b| -> Result<TopKQueue> {
                        bucket.run(b, &mut queue)?;
                        Ok(queue)
                    },
                )
                .try_reduce(
                    || TopKQueue::new(config.top_k()),
                    |mut left, right| -> Result<TopKQueue> {
                        left.merge(right);
                        Ok(left)
                    },
                )?
        } else {
            let mut queue = TopKQueue::new(config.top_k());
            for &b in &order {
                bucket.run(b, &mut queue)?;
            }
            queue
        };
        Ok(queue.into_candidates())
    }
}

/// Cardinalities `a, a+1, a-1, a+2, …` restricted to `[b_min, b_max]`.
fn expansion_order(a: usize, b_min: usize, b_max: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(b_max.saturating_sub(b_min) + 1);
    let mut step = 0;
    loop {
        let down = a.checked_sub(step).filter(|&i| i >= b_min);
        let up = Some(a + 1 + step).filter(|&j| j <= b_max);
        if down.is_none() && up.is_none() {
            break;
        }
        if let Some(i) = down.filter(|&i| i <= b_max) {
            order.push(i);
        }
        if let Some(j) = up.filter(|&j| j >= b_min) {
            order.push(j);
        }
        step += 1;
    }
    order
}

struct BucketSearch<'a> {
    indices: &'a InvertedIndices,
    terms: &'a [String],
    config: &'a SearchConfig,
    merger: MergerKind,
}

impl BucketSearch<'_> {
    fn run(&self, b: usize, queue: &mut TopKQueue) -> Result<()> {
        let a = self.terms.len();
        let (metric, alpha) = (self.config.metric(), self.config.similarity());
        let mut threshold = metric.threshold(alpha, a, b);
        if threshold == 0 || threshold > b {
            return Ok(());
        }
        if queue.is_full() {
            if let Some(lowest) = queue.lowest_score() {
                let best = 1.0 - metric.distance(a.min(b), a, b);
                if best < lowest {
                    return Ok(());
                }
                threshold = threshold.max(metric.threshold(lowest, a, b));
            }
        }
        let Some(index) = self.indices.get(b) else {
            return Ok(());
        };

        let mut lists = Vec::with_capacity(a);
        for term in self.terms {
            if let Some(list) = index.posting_list(term)? {
                lists.push(list);
            }
        }
        if lists.len() < threshold {
            return Ok(());
        }

        let mut collector = |c: Candidate| -> Result<(), CollectionTerminated> {
            queue.add(c.position(), 1.0 - metric.distance(c.overlap(), a, b));
            Ok(())
        };
        self.merger.merge(&mut lists, threshold, &mut collector);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expansion_order() {
        assert_eq!(expansion_order(5, 3, 8), vec![5, 6, 4, 7, 3, 8]);
        assert_eq!(expansion_order(5, 5, 5), vec![5]);
        assert_eq!(expansion_order(5, 1, 3), vec![3, 2, 1]);
        assert_eq!(expansion_order(2, 4, 6), vec![4, 5, 6]);
        assert_eq!(expansion_order(9, 5, 14), vec![9, 10, 8, 11, 7, 12, 6, 13, 5, 14]);
    }
}
