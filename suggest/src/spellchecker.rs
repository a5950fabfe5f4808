//! Word completion and correction ranked by a language model.
use std::path::PathBuf;

use hashbrown::HashSet;

use crate::description::{Driver, IndexDescription};
use crate::errors::{Result, SuggestError};
use crate::lm::LanguageModel;
use crate::metric::Metric;
use crate::search::{SearchConfig, TopKQueue};
use crate::service::NGramIndex;
use crate::store::RamDirectory;

/// Number of index candidates fetched per requested word.
const CANDIDATES_PER_WORD: usize = 10;

/// A language model with an n-gram index over its vocabulary.
pub struct SpellChecker {
    model: LanguageModel,
    index: NGramIndex,
}

impl SpellChecker {
    /// Creates a spell checker; the index must be built over the vocabulary
    /// of the model so that document ids are word ids.
    pub fn new(model: LanguageModel, index: NGramIndex) -> Self {
        Self { model, index }
    }

    /// Creates a spell checker, indexing the vocabulary into memory with
    /// n-grams of `ngram_size` letters or digits.
    pub fn from_model(model: LanguageModel, ngram_size: usize) -> Result<Self> {
        let description = IndexDescription {
            driver: Driver::Ram,
            name: "vocabulary".to_string(),
            ngram_size,
            source: PathBuf::new(),
            output: PathBuf::new(),
            alphabet: vec![
                "english".to_string(),
                "russian".to_string(),
                "numbers".to_string(),
            ],
            pad: "$".to_string(),
            wrap: ["$".to_string(), "$".to_string()],
        };
        let dictionary = model.indexer().dictionary().clone();
        let index = NGramIndex::build(description, dictionary, &RamDirectory::new())?;
        Ok(Self::new(model, index))
    }

    /// Gets the model.
    pub fn model(&self) -> &LanguageModel {
        &self.model
    }

    /// Predicts the `top_k` best words for the end of `query`, best first.
    ///
    /// A query ending in whitespace asks for the next word. Otherwise its
    /// last word is completed or corrected: candidates come from
    /// autocomplete and from Jaccard search with `similarity`, and are
    /// ranked by the model given the preceding words.
    ///
    /// # Errors
    ///
    /// [`SuggestError::InvalidConfig`] is returned when `top_k` is zero or
    /// `similarity` is out of `(0, 1]`.
    pub fn predict(
        &self,
        query: &str,
        top_k: usize,
        similarity: f64,
    ) -> Result<Vec<(String, f64)>> {
        if top_k == 0 {
            return Err(SuggestError::invalid_config(
                "top_k",
                "must be greater than zero",
            ));
        }
        let query = query.to_lowercase();
        let words: Vec<&str> = query.split_whitespace().collect();
        let Some((&last, context)) = words.split_last() else {
            return self.model.predict(&words[..], top_k);
        };
        if query.ends_with(char::is_whitespace) {
            return self.model.predict(&words[..], top_k);
        }

        let pool = top_k.saturating_mul(CANDIDATES_PER_WORD);
        let config = SearchConfig::new(last, pool, Metric::Jaccard, similarity)?;
        let completions = self.index.autocomplete_search(last, pool)?;
        let corrections = self.index.fuzzy_search(&config)?;
        tracing::debug!(
            word = last,
            num_completions = completions.len(),
            num_corrections = corrections.len(),
            "spell candidates"
        );

        let mut ids = self.model.context_ids(context)?;
        let mut seen = HashSet::new();
        let mut queue = TopKQueue::new(top_k);
        for r in completions.into_iter().chain(corrections) {
            if self.model.is_marker(r.position) || !seen.insert(r.position) {
                continue;
            }
            ids.push(r.position);
            queue.add(r.position, self.model.score(&ids));
            ids.pop();
        }

        let mut predictions = Vec::with_capacity(queue.len());
        for r in queue.into_candidates() {
            if let Some(word) = self.model.indexer().word(r.position)? {
                predictions.push((word, r.score));
            }
        }
        Ok(predictions)
    }
}
