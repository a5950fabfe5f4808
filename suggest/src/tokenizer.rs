//! Tokenizer splitting text into character n-grams.
use std::sync::Arc;

use hashbrown::HashSet;

use crate::alphabet::Alphabet;
use crate::errors::{Result, SuggestError};

/// N-gram tokenizer.
///
/// Text is lowercased and trimmed, every character outside of the alphabet is
/// replaced by the pad, and the result is wrapped before windows of
/// `ngram_size` characters are cut. Terms are unique and keep their first-seen
/// order.
#[derive(Debug, Clone)]
pub struct NGramTokenizer {
    ngram_size: usize,
    alphabet: Arc<dyn Alphabet>,
    pad: String,
    wrap: [String; 2],
    right_wrap: bool,
}

impl NGramTokenizer {
    /// Creates a tokenizer that wraps both sides, used for fuzzy search.
    ///
    /// # Arguments
    ///
    /// * `ngram_size` - Number of characters per term.
    /// * `alphabet` - Characters kept as is.
    /// * `pad` - Replacement of characters outside of the alphabet.
    /// * `wrap` - Left and right wrapping symbols.
    ///
    /// # Errors
    ///
    /// [`SuggestError`] is returned when `ngram_size` is zero.
    pub fn new(
        ngram_size: usize,
        alphabet: Arc<dyn Alphabet>,
        pad: impl Into<String>,
        wrap: [String; 2],
    ) -> Result<Self> {
        if ngram_size == 0 {
            return Err(SuggestError::invalid_config(
                "ngram_size",
                "must be greater than zero",
            ));
        }
        Ok(Self {
            ngram_size,
            alphabet,
            pad: pad.into(),
            wrap,
            right_wrap: true,
        })
    }

    /// Drops the right wrap so that partial queries match prefixes.
    pub fn without_right_wrap(mut self) -> Self {
        self.right_wrap = false;
        self
    }

    /// Gets the number of characters per term.
    #[inline(always)]
    pub const fn ngram_size(&self) -> usize {
        self.ngram_size
    }

    /// Lowercases, trims, pads and wraps the text.
    pub fn normalize(&self, text: &str) -> String {
        let mut normalized = String::with_capacity(text.len() + 2 * self.wrap[0].len());
        normalized.push_str(&self.wrap[0]);
        for c in text.trim().chars().flat_map(char::to_lowercase) {
            if self.alphabet.has(c) {
                normalized.push(self.alphabet.fold(c));
            } else {
                normalized.push_str(&self.pad);
            }
        }
        if self.right_wrap {
            normalized.push_str(&self.wrap[1]);
        }
        normalized
    }

    /// Splits the text into unique n-grams.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut terms = vec![];
        self.tokenize_into(text, &mut terms);
        terms
    }

    /// Splits the text into unique n-grams, reusing the given buffer.
    pub fn tokenize_into(&self, text: &str, terms: &mut Vec<String>) {
        terms.clear();
        if text.trim().is_empty() {
            return;
        }
        let normalized = self.normalize(text);
        let mut seen = HashSet::new();
        for ngram in split_into_ngrams(&normalized, self.ngram_size) {
            if seen.insert(ngram) {
                terms.push(ngram.to_string());
            }
        }
    }
}

/// Cuts windows of `k` characters, aligned to char boundaries.
///
/// A text shorter than `k` yields itself as the single window.
pub fn split_into_ngrams(text: &str, k: usize) -> Vec<&str> {
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let num_chars = bounds.len() - 1;
    if num_chars == 0 || k == 0 {
        return vec![];
    }
    if num_chars < k {
        return vec![text];
    }
    (0..=num_chars - k)
        .map(|i| &text[bounds[i]..bounds[i + k]])
        .collect()
}
