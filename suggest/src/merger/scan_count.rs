use super::{Candidate, Collector, ListMerger};
use crate::posting::PostingList;

/// Streaming merge of every list into a sorted accumulator.
///
/// Runs in `O(Σ|L_i|)` and touches every element of every list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanCount;

impl ScanCount {
    /// Merges `lists` into `candidates`, which must be sorted by position.
    pub(crate) fn accumulate<P>(lists: &mut [P], candidates: &mut Vec<Candidate>)
    where
        P: PostingList,
    {
        let mut merged = Vec::with_capacity(candidates.len());
        for list in lists {
            merge_list(list, candidates, &mut merged);
            std::mem::swap(candidates, &mut merged);
        }
    }
}

fn merge_list<P>(list: &mut P, candidates: &[Candidate], merged: &mut Vec<Candidate>)
where
    P: PostingList,
{
    merged.clear();
    let mut i = 0;
    let mut cur = list.get();
    loop {
        match (candidates.get(i), cur) {
            (Some(&c), Ok(v)) => {
                if c.position() < v {
                    merged.push(c);
                    i += 1;
                } else if c.position() == v {
                    let mut c = c;
                    c.increment();
                    merged.push(c);
                    i += 1;
                    cur = list.next();
                } else {
                    merged.push(Candidate::new(v, 1));
                    cur = list.next();
                }
            }
            (Some(_), Err(_)) => {
                merged.extend_from_slice(&candidates[i..]);
                break;
            }
            (None, Ok(v)) => {
                merged.push(Candidate::new(v, 1));
                cur = list.next();
            }
            (None, Err(_)) => break,
        }
    }
}

impl ListMerger for ScanCount {
    fn merge<P>(&self, lists: &mut [P], threshold: usize, collector: &mut dyn Collector)
    where
        P: PostingList,
    {
        if threshold == 0 || threshold > lists.len() {
            return;
        }
        let mut candidates = vec![];
        Self::accumulate(lists, &mut candidates);
        for c in candidates {
            if c.overlap() >= threshold && collector.collect(c).is_err() {
                return;
            }
        }
    }
}
