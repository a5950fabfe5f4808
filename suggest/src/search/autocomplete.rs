use super::Ranked;
use crate::errors::{Result, SuggestError};
use crate::index::InvertedIndices;
use crate::merger::{FirstKCollector, Intersector};
use crate::tokenizer::NGramTokenizer;

/// Prefix search over the union index.
///
/// The tokenizer should omit the right wrap so that a partial query only
/// yields n-grams its completions contain.
#[derive(Debug, Clone)]
pub struct AutocompleteSearcher {
    tokenizer: NGramTokenizer,
}

impl AutocompleteSearcher {
    /// Creates a searcher.
    pub fn new(tokenizer: NGramTokenizer) -> Self {
        Self { tokenizer }
    }

    /// Gets the tokenizer.
    pub fn tokenizer(&self) -> &NGramTokenizer {
        &self.tokenizer
    }

    /// Gets the first `top_k` documents containing every n-gram of the query,
    /// in id order, each with score 0.
    ///
    /// # Errors
    ///
    /// [`SuggestError`] is returned when `top_k` is zero or a posting list
    /// cannot be decoded.
    pub fn search(&self, indices: &InvertedIndices, query: &str, top_k: usize) -> Result<Vec<Ranked>> {
        if top_k == 0 {
            return Err(SuggestError::invalid_config(
                "top_k",
                "must be greater than zero",
            ));
        }
        let terms = self.tokenizer.tokenize(query);
        if terms.is_empty() {
            return Ok(vec![]);
        }
        let Some(union) = indices.get(0) else {
            return Ok(vec![]);
        };
        let mut lists = Vec::with_capacity(terms.len());
        for term in &terms {
            match union.posting_list(term)? {
                Some(list) => lists.push(list),
                None => return Ok(vec![]),
            }
        }
        tracing::debug!(query, num_terms = terms.len(), "autocomplete");

        let mut collector = FirstKCollector::new(top_k);
        Intersector.intersect(&mut lists, &mut collector);
        Ok(collector
            .into_inner()
            .into_iter()
            .map(|c| Ranked::new(c.position(), 0.0))
            .collect())
    }
}
