use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::{Candidate, Collector, ListMerger};
use crate::posting::PostingList;

/// Heap-based merge that skips ids which cannot reach the threshold.
///
/// When fewer than `t` lists share the minimum id, `t - 1` lists are popped
/// and moved straight to the id on top of the heap: no smaller id can occur in
/// `t` lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeSkip;

impl ListMerger for MergeSkip {
    fn merge<P>(&self, lists: &mut [P], threshold: usize, collector: &mut dyn Collector)
    where
        P: PostingList,
    {
        if threshold == 0 || threshold > lists.len() {
            return;
        }
        let mut heap: BinaryHeap<Reverse<(u32, usize)>> = lists
            .iter()
            .enumerate()
            .filter_map(|(i, list)| list.get().ok().map(|v| Reverse((v, i))))
            .collect();
        let mut popped = Vec::with_capacity(lists.len());

        while heap.len() >= threshold {
            popped.clear();
            let Some(Reverse((p, i))) = heap.pop() else {
                return;
            };
            popped.push(i);
            while let Some(&Reverse((q, j))) = heap.peek() {
                if q != p {
                    break;
                }
                heap.pop();
                popped.push(j);
            }

            if popped.len() >= threshold {
                // Lists never exceed u32::MAX entries.
                let overlap = popped.len() as u32;
                if collector.collect(Candidate::new(p, overlap)).is_err() {
                    return;
                }
                for &i in &popped {
                    if let Ok(v) = lists[i].next() {
                        heap.push(Reverse((v, i)));
                    }
                }
            } else {
                while popped.len() < threshold - 1 {
                    let Some(Reverse((_, j))) = heap.pop() else {
                        break;
                    };
                    popped.push(j);
                }
                let Some(&Reverse((top, _))) = heap.peek() else {
                    return;
                };
                for &i in &popped {
                    if let Ok(v) = lists[i].lower_bound(top) {
                        heap.push(Reverse((v, i)));
                    }
                }
            }
        }
    }
}
