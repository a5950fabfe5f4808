use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A scored document.
///
/// Orders by score, then by id reversed, so that the greater of two ranks
/// better.
#[derive(Debug, Clone, Copy)]
pub struct Ranked {
    /// Document id.
    pub position: u32,

    /// Similarity in `[0, 1]`, or a language-model score.
    pub score: f64,
}

impl Ranked {
    /// Creates a scored document.
    #[inline(always)]
    pub const fn new(position: u32, score: f64) -> Self {
        Self { position, score }
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// Fixed-capacity queue keeping the `k` best documents.
///
/// The heap root is the worst kept document, so a better one replaces it with
/// a single sift-down.
#[derive(Debug, Clone)]
pub struct TopKQueue {
    k: usize,
    heap: BinaryHeap<Reverse<Ranked>>,
}

impl TopKQueue {
    /// Creates a queue of capacity `k`.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k),
        }
    }

    /// Offers a document; it is kept if the queue is not full or it ranks
    /// above the worst kept one.
    pub fn add(&mut self, position: u32, score: f64) {
        let candidate = Ranked::new(position, score);
        if self.heap.len() < self.k {
            self.heap.push(Reverse(candidate));
        } else if let Some(mut worst) = self.heap.peek_mut() {
            if candidate > worst.0 {
                *worst = Reverse(candidate);
            }
        }
    }

    /// Gets the score of the worst kept document.
    #[inline(always)]
    pub fn lowest_score(&self) -> Option<f64> {
        self.heap.peek().map(|worst| worst.0.score)
    }

    /// Checks if a document with `score` could enter the queue.
    pub fn can_take_with_score(&self, score: f64) -> bool {
        !self.is_full() || self.lowest_score().map_or(false, |lowest| score > lowest)
    }

    /// Checks if `k` documents are kept.
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    /// Gets the number of kept documents.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Checks if no document is kept.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offers every document of `other`.
    pub fn merge(&mut self, other: Self) {
        for Reverse(ranked) in other.heap {
            self.add(ranked.position, ranked.score);
        }
    }

    /// Gets the kept documents, best first, leaving the queue untouched.
    pub fn candidates(&self) -> Vec<Ranked> {
        self.clone().into_candidates()
    }

    /// Gets the kept documents, best first.
    pub fn into_candidates(self) -> Vec<Ranked> {
        // Ascending order of `Reverse` is descending order of rank.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(ranked)| ranked)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(ranked: &[Ranked]) -> Vec<(u32, f64)> {
        ranked.iter().map(|r| (r.position, r.score)).collect()
    }

    #[test]
    fn test_scenario() {
        let mut queue = TopKQueue::new(3);
        for (position, score) in [
            (1, 0.1),
            (2, 0.01),
            (3, 0.91),
            (4, 0.24),
            (5, 0.13),
            (6, 0.07),
            (7, 0.9),
            (8, 0.12),
            (9, 0.65),
            (10, 0.6565),
        ] {
            queue.add(position, score);
        }
        assert_eq!(
            pairs(&queue.candidates()),
            vec![(3, 0.91), (7, 0.9), (10, 0.6565)]
        );
        assert_eq!(queue.lowest_score(), Some(0.6565));
        assert!(queue.can_take_with_score(0.6566));
        assert!(!queue.can_take_with_score(0.6565));
        // Reading the candidates does not drain the queue.
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_ties_prefer_smaller_ids() {
        let mut queue = TopKQueue::new(2);
        queue.add(5, 0.5);
        queue.add(3, 0.5);
        queue.add(9, 0.5);
        queue.add(1, 0.5);
        assert_eq!(pairs(&queue.candidates()), vec![(1, 0.5), (3, 0.5)]);
    }

    #[test]
    fn test_not_full() {
        let mut queue = TopKQueue::new(4);
        assert_eq!(queue.lowest_score(), None);
        assert!(queue.can_take_with_score(0.0));
        queue.add(2, 0.3);
        queue.add(1, 0.7);
        assert!(!queue.is_full());
        assert!(queue.can_take_with_score(0.0));
        assert_eq!(pairs(&queue.into_candidates()), vec![(1, 0.7), (2, 0.3)]);
    }

    #[test]
    fn test_merge() {
        let mut left = TopKQueue::new(2);
        left.add(1, 0.2);
        left.add(2, 0.9);
        let mut right = TopKQueue::new(2);
        right.add(3, 0.5);
        right.add(4, 0.1);
        left.merge(right);
        assert_eq!(pairs(&left.into_candidates()), vec![(2, 0.9), (3, 0.5)]);
    }
}
