//! Word n-gram language model with stupid-backoff scoring.
//!
//! Counts are collected from a corpus or from Google n-gram files by
//! [`LanguageModelBuilder`], then packed into one sorted [`NGramVector`] per
//! order. A word id maps to its string through the vocabulary dictionary and
//! back through a minimal perfect hash.
mod builder;
mod google;
mod indexer;
mod retriever;
mod trie;
mod vector;

use std::io::{BufRead, Write};
use std::sync::Arc;

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::dictionary::Dictionary;
use crate::errors::{Result, SuggestError};
use crate::mph::Mph;
use crate::search::TopKQueue;
use vector::ROOT_CONTEXT;

pub use builder::LanguageModelBuilder;
pub use google::{read_ngrams, GoogleNGramReader};
pub use indexer::WordIndexer;
pub use retriever::SentenceRetriever;
pub use vector::{NGramVector, SubVector};

/// Id of a word in the vocabulary.
pub type WordId = u32;

/// Position of an n-gram in the vector of its order.
pub type ContextOffset = u32;

/// Id of the words out of the vocabulary.
pub const UNKNOWN_WORD_ID: WordId = 0xFFFF_FFFF;

/// Context offset of the unigrams.
pub const INVALID_CONTEXT_OFFSET: ContextOffset = 0xFFFF_FFFE;

/// Score of a sequence no suffix of which was seen.
pub const UNKNOWN_WORD_SCORE: f64 = -100.0;

/// Multiplier per dropped word when backing off to a shorter n-gram.
pub const BACKOFF_ALPHA: f64 = 0.4;

/// Version tag of the serialized model.
pub const LM_VERSION: &str = "0.0.2";

/// Marker prepended to every sentence.
pub const START_SYMBOL: &str = "<S>";

/// Marker appended to every sentence.
pub const END_SYMBOL: &str = "</S>";

/// N-gram model of a fixed order.
#[derive(Debug, Clone)]
pub struct LanguageModel {
    order: usize,
    vectors: Vec<NGramVector>,
    indexer: WordIndexer,
    start: WordId,
    end: WordId,
}

impl LanguageModel {
    pub(crate) fn new(
        order: usize,
        mut vectors: Vec<NGramVector>,
        indexer: WordIndexer,
    ) -> Result<Self> {
        if order == 0 || order > usize::from(u8::MAX) || vectors.len() > order {
            return Err(SuggestError::invalid_format(
                "language model",
                "order out of range",
            ));
        }
        vectors.resize_with(order, NGramVector::default);
        let start = indexer.get(START_SYMBOL)?;
        let end = indexer.get(END_SYMBOL)?;
        if start == UNKNOWN_WORD_ID || end == UNKNOWN_WORD_ID {
            return Err(SuggestError::invalid_format(
                "language model",
                "sentence markers are missing in the vocabulary",
            ));
        }
        Ok(Self {
            order,
            vectors,
            indexer,
            start,
            end,
        })
    }

    /// Gets the order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Gets the word indexer.
    pub fn indexer(&self) -> &WordIndexer {
        &self.indexer
    }

    /// Gets the vector of n-grams of length `k + 1`.
    pub fn vector(&self, k: usize) -> Option<&NGramVector> {
        self.vectors.get(k)
    }

    /// Gets the id of `token`, or [`UNKNOWN_WORD_ID`].
    pub fn word_id(&self, token: &str) -> Result<WordId> {
        self.indexer.get(token)
    }

    /// Gets the count of the path, the count of its prefix and its offset.
    fn find(&self, path: &[WordId]) -> Option<(u64, u64, ContextOffset)> {
        let mut context = ROOT_CONTEXT;
        let mut context_count = self.vectors.first()?.total_count();
        for (level, &word) in path.iter().enumerate() {
            let (count, offset) = self.vectors.get(level)?.get_count(word, context)?;
            if level + 1 == path.len() {
                return Some((count, context_count, offset));
            }
            context = offset;
            context_count = count;
        }
        None
    }

    /// Scores the last word of `ngram` given the preceding words.
    ///
    /// The longest suffix seen in training scores `ln(count / context
    /// count)`, plus `ln 0.4` per word dropped to reach it. Without any seen
    /// suffix the score is [`UNKNOWN_WORD_SCORE`].
    pub fn score(&self, ngram: &[WordId]) -> f64 {
        let ngram = &ngram[ngram.len().saturating_sub(self.order)..];
        for backoff in 0..ngram.len() {
            if let Some((count, context_count, _)) = self.find(&ngram[backoff..]) {
                if count > 0 && context_count > 0 {
                    return (count as f64 / context_count as f64).ln()
                        + backoff as f64 * BACKOFF_ALPHA.ln();
                }
            }
        }
        UNKNOWN_WORD_SCORE
    }

    /// Scores a sentence as the sum of the scores of its windows of `order`
    /// words, the sentence being wrapped in the sentence markers.
    pub fn score_sentence<S>(&self, words: &[S]) -> Result<f64>
    where
        S: AsRef<str>,
    {
        let ids = self.wrap(words)?;
        if ids.len() <= self.order {
            return Ok(self.score(&ids));
        }
        Ok(ids.windows(self.order).map(|w| self.score(w)).sum())
    }

    fn wrap<S>(&self, words: &[S]) -> Result<Vec<WordId>>
    where
        S: AsRef<str>,
    {
        let mut ids = self.context_ids(words)?;
        ids.push(self.end);
        Ok(ids)
    }

    /// Gets the ids of a sentence start: the start marker then the words.
    pub fn context_ids<S>(&self, words: &[S]) -> Result<Vec<WordId>>
    where
        S: AsRef<str>,
    {
        let mut ids = Vec::with_capacity(words.len() + 2);
        ids.push(self.start);
        for word in words {
            ids.push(self.word_id(word.as_ref())?);
        }
        Ok(ids)
    }

    /// Checks if `id` is one of the sentence markers.
    #[inline(always)]
    pub fn is_marker(&self, id: WordId) -> bool {
        id == self.start || id == self.end
    }

    /// Enumerates the words seen after `context` with their scores.
    ///
    /// The longest suffix of the context with continuations is used,
    /// adding `ln 0.4` per dropped word; the empty context yields every
    /// unigram.
    pub fn next(&self, context: &[WordId]) -> Vec<(WordId, f64)> {
        let context = &context[context.len().saturating_sub(self.order - 1)..];
        for backoff in 0..=context.len() {
            let suffix = &context[backoff..];
            let (offset, context_count) = if suffix.is_empty() {
                (ROOT_CONTEXT, self.vectors[0].total_count())
            } else {
                match self.find(suffix) {
                    Some((count, _, offset)) => (offset, count),
                    None => continue,
                }
            };
            let Some(vector) = self.vectors.get(suffix.len()) else {
                continue;
            };
            let children = vector.sub_vector(offset);
            if context_count == 0 || children.is_empty() {
                continue;
            }
            let penalty = backoff as f64 * BACKOFF_ALPHA.ln();
            return children
                .iter()
                .filter(|&(_, count)| count > 0)
                .map(|(word, count)| {
                    (word, (count as f64 / context_count as f64).ln() + penalty)
                })
                .collect();
        }
        vec![]
    }

    /// Predicts the `top_k` best words following the words of a sentence
    /// start, best first.
    pub fn predict<S>(&self, context: &[S], top_k: usize) -> Result<Vec<(String, f64)>>
    where
        S: AsRef<str>,
    {
        let ids = self.context_ids(context)?;
        let mut queue = TopKQueue::new(top_k);
        for (word, score) in self.next(&ids) {
            if !self.is_marker(word) {
                queue.add(word, score);
            }
        }
        let mut predictions = Vec::with_capacity(queue.len());
        for r in queue.into_candidates() {
            if let Some(word) = self.indexer.word(r.position)? {
                predictions.push((word, r.score));
            }
        }
        Ok(predictions)
    }

    /// Writes the version tag, the order, the vectors and the hash.
    ///
    /// The vocabulary is not included; see [`Dictionary`].
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        wtr.write_all(LM_VERSION.as_bytes())?;
        wtr.write_u8(u8::try_from(self.order)?)?;
        for vector in &self.vectors {
            vector.write(&mut wtr)?;
        }
        self.indexer.mph().write(&mut wtr)?;
        Ok(())
    }

    /// Reads a model written by [`LanguageModel::write`] over its vocabulary.
    ///
    /// # Errors
    ///
    /// [`SuggestError::IndexVersionMismatch`] is returned for another version
    /// tag, and [`SuggestError::InvalidFormat`] when the hash does not cover
    /// the vocabulary.
    pub fn read<R>(mut rdr: R, dictionary: Arc<dyn Dictionary>) -> Result<Self>
    where
        R: BufRead,
    {
        let mut version = [0; LM_VERSION.len()];
        rdr.read_exact(&mut version)?;
        if version != LM_VERSION.as_bytes() {
            return Err(SuggestError::IndexVersionMismatch {
                expected: LM_VERSION.to_string(),
                found: String::from_utf8_lossy(&version).into_owned(),
            });
        }
        let order = usize::from(rdr.read_u8()?);
        let vectors = (0..order)
            .map(|_| NGramVector::read(&mut rdr))
            .collect::<Result<Vec<_>>>()?;
        let mph = Mph::read(&mut rdr)?;
        if mph.len() != dictionary.size() {
            return Err(SuggestError::invalid_format(
                "language model",
                "the hash does not match the vocabulary",
            ));
        }
        let model = Self::new(order, vectors, WordIndexer::new(dictionary, mph))?;
        tracing::info!(
            order,
            num_words = model.indexer.dictionary().size(),
            num_ngrams = model.vectors.iter().map(NGramVector::len).sum::<usize>(),
            "language model loaded"
        );
        Ok(model)
    }
}
