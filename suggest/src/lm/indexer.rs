use std::fmt;
use std::sync::Arc;

use crate::dictionary::Dictionary;
use crate::errors::Result;
use crate::lm::{WordId, UNKNOWN_WORD_ID};
use crate::mph::Mph;

/// Maps tokens to word ids through a perfect hash over the vocabulary.
#[derive(Clone)]
pub struct WordIndexer {
    dictionary: Arc<dyn Dictionary>,
    mph: Mph,
}

impl fmt::Debug for WordIndexer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("WordIndexer")
            .field("num_words", &self.dictionary.size())
            .finish()
    }
}

impl WordIndexer {
    /// Creates an indexer from a vocabulary and its hash.
    pub fn new(dictionary: Arc<dyn Dictionary>, mph: Mph) -> Self {
        Self { dictionary, mph }
    }

    /// Creates an indexer, building the hash of the vocabulary.
    pub fn build(dictionary: Arc<dyn Dictionary>) -> Result<Self> {
        let mph = Mph::from_dictionary(dictionary.as_ref())?;
        Ok(Self::new(dictionary, mph))
    }

    /// Gets the id of `token`, or [`UNKNOWN_WORD_ID`] if it is out of the
    /// vocabulary.
    pub fn get(&self, token: &str) -> Result<WordId> {
        let Some(id) = self.mph.get(token) else {
            return Ok(UNKNOWN_WORD_ID);
        };
        // The hash maps unseen tokens to arbitrary ids.
        match self.dictionary.get(id)? {
            Some(word) if word == token => Ok(id),
            _ => Ok(UNKNOWN_WORD_ID),
        }
    }

    /// Gets the word of `id`.
    pub fn word(&self, id: WordId) -> Result<Option<String>> {
        self.dictionary.get(id)
    }

    /// Gets the hash.
    pub fn mph(&self) -> &Mph {
        &self.mph
    }

    /// Gets the vocabulary.
    pub fn dictionary(&self) -> &Arc<dyn Dictionary> {
        &self.dictionary
    }
}
