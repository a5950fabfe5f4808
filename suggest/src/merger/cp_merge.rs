use super::{Candidate, Collector, ListMerger, ScanCount};
use crate::posting::PostingList;

/// CPMerge by Okazaki and Tsujii.
///
/// The `m - t + 1` shortest lists are scanned to produce candidates; an id
/// absent from all of them cannot reach `t`. The remaining lists are only
/// probed with `lower_bound`, and candidates that can no longer reach `t`
/// are pruned after every list.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpMerge;

impl ListMerger for CpMerge {
    fn merge<P>(&self, lists: &mut [P], threshold: usize, collector: &mut dyn Collector)
    where
        P: PostingList,
    {
        let m = lists.len();
        if threshold == 0 || threshold > m {
            return;
        }
        lists.sort_unstable_by_key(|list| list.len());

        let num_scanned = m - threshold + 1;
        let mut candidates: Vec<Candidate> = vec![];
        ScanCount::accumulate(&mut lists[..num_scanned], &mut candidates);

        if num_scanned == m {
            for c in candidates {
                if collector.collect(c).is_err() {
                    return;
                }
            }
            return;
        }

        for i in num_scanned..m {
            let remaining = m - i - 1;
            let list = &mut lists[i];
            let mut exhausted = false;
            let mut kept = 0;
            for j in 0..candidates.len() {
                let mut c = candidates[j];
                if !exhausted {
                    match list.lower_bound(c.position()) {
                        Ok(v) if v == c.position() => c.increment(),
                        Ok(_) => {}
                        Err(_) => exhausted = true,
                    }
                }
                if remaining == 0 {
                    if c.overlap() >= threshold && collector.collect(c).is_err() {
                        return;
                    }
                } else if c.overlap() + remaining >= threshold {
                    candidates[kept] = c;
                    kept += 1;
                }
            }
            candidates.truncate(kept);
            if candidates.is_empty() {
                return;
            }
        }
    }
}
