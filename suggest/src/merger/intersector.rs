use super::{Candidate, Collector};
use crate::posting::PostingList;

/// K-way intersection driven by the shortest list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Intersector;

impl Intersector {
    /// Emits every id present in all lists, in ascending order, with the
    /// number of lists as its overlap.
    pub fn intersect<P>(&self, lists: &mut [P], collector: &mut dyn Collector)
    where
        P: PostingList,
    {
        // Lists never exceed u32::MAX entries.
        let num_lists = lists.len() as u32;
        lists.sort_unstable_by_key(|list| list.len());
        let Some((shortest, rest)) = lists.split_first_mut() else {
            return;
        };

        let mut cur = shortest.get();
        'outer: while let Ok(x) = cur {
            for list in rest.iter_mut() {
                match list.lower_bound(x) {
                    Ok(v) if v == x => {}
                    Ok(v) => {
                        cur = shortest.lower_bound(v);
                        continue 'outer;
                    }
                    Err(_) => return,
                }
            }
            if collector.collect(Candidate::new(x, num_lists)).is_err() {
                return;
            }
            cur = shortest.next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::merger::{FirstKCollector, VecCollector};
    use crate::posting::SliceIterator;

    fn intersect(lists: &[Vec<u32>]) -> Vec<(u32, usize)> {
        let mut iters: Vec<_> = lists.iter().cloned().map(SliceIterator::new).collect();
        let mut collector = VecCollector::default();
        Intersector.intersect(&mut iters, &mut collector);
        collector
            .into_inner()
            .into_iter()
            .map(|c| (c.position(), c.overlap()))
            .collect()
    }

    #[test]
    fn test_intersect() {
        let lists = vec![
            vec![0, 1, 2, 3, 4, 8, 10],
            vec![1, 3, 4, 5, 10],
            vec![1, 2, 4, 10, 11],
        ];
        assert_eq!(intersect(&lists), vec![(1, 3), (4, 3), (10, 3)]);
    }

    #[test]
    fn test_intersect_disjoint() {
        assert!(intersect(&[vec![1, 3], vec![2, 4]]).is_empty());
        assert!(intersect(&[vec![1, 3], vec![]]).is_empty());
        assert!(intersect(&[]).is_empty());
    }

    #[test]
    fn test_intersect_single() {
        assert_eq!(intersect(&[vec![5, 6]]), vec![(5, 1), (6, 1)]);
    }

    #[test]
    fn test_intersect_first_k() {
        let mut iters = vec![
            SliceIterator::new((0..100).collect()),
            SliceIterator::new((0..100).step_by(2).collect()),
        ];
        let mut collector = FirstKCollector::new(3);
        Intersector.intersect(&mut iters, &mut collector);
        let positions: Vec<_> = collector
            .into_inner()
            .into_iter()
            .map(Candidate::position)
            .collect();
        assert_eq!(positions, vec![0, 2, 4]);
    }
}
