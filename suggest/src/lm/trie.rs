use hashbrown::HashMap;

use crate::errors::Result;
use crate::lm::vector::{NGramVector, ROOT_CONTEXT};
use crate::lm::WordId;

/// Accumulated counts of n-gram paths.
#[derive(Debug, Default)]
pub(crate) struct CountTrie {
    count: u64,
    children: HashMap<WordId, CountTrie>,
}

impl CountTrie {
    /// Adds `count` to the node of `path`.
    pub fn add(&mut self, path: &[WordId], count: u64) {
        let mut node = self;
        for &word in path {
            node = node.children.entry(word).or_default();
        }
        node.count += count;
    }

    /// Packs the first `order` levels into n-gram vectors.
    ///
    /// The offsets of level `ℓ` are known only once it is sorted, so the
    /// levels are built one after another, carrying the nodes of the
    /// previous level with their offsets.
    pub fn into_vectors(self, order: usize) -> Result<Vec<NGramVector>> {
        let mut vectors = Vec::with_capacity(order);
        let mut frontier: Vec<(u32, CountTrie)> = vec![(ROOT_CONTEXT, self)];
        for _ in 0..order {
            let mut records = vec![];
            let mut nodes = vec![];
            for (context, node) in frontier {
                for (word, child) in node.children {
                    records.push((context, word, child.count));
                    nodes.push((context, word, child));
                }
            }
            if records.is_empty() {
                break;
            }
            let vector = NGramVector::from_records(records)?;
            frontier = nodes
                .into_iter()
                .filter(|(_, _, child)| !child.children.is_empty())
                .filter_map(|(context, word, child)| {
                    vector
                        .get_count(word, context)
                        .map(|(_, offset)| (offset, child))
                })
                .collect();
            vectors.push(vector);
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_vectors() {
        let mut trie = CountTrie::default();
        trie.add(&[0], 2);
        trie.add(&[1], 1);
        trie.add(&[0, 1], 1);
        trie.add(&[0, 0], 1);
        trie.add(&[0, 1], 1);
        trie.add(&[1, 0, 1], 3);

        let vectors = trie.into_vectors(3).unwrap();
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0].total_count(), 3);

        let (count, w0) = vectors[0].get_count(0, ROOT_CONTEXT).unwrap();
        assert_eq!(count, 2);
        let (count, _) = vectors[1].get_count(1, w0).unwrap();
        assert_eq!(count, 2);

        let (_, w1) = vectors[0].get_count(1, ROOT_CONTEXT).unwrap();
        let (count, w10) = vectors[1].get_count(0, w1).unwrap();
        assert_eq!(count, 0);
        let (count, _) = vectors[2].get_count(1, w10).unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_order_cuts_deeper_levels() {
        let mut trie = CountTrie::default();
        trie.add(&[0, 1, 2], 1);
        assert_eq!(trie.into_vectors(2).unwrap().len(), 2);
    }
}
