use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::dictionary::InMemoryDictionary;
use crate::errors::{Result, SuggestError};
use crate::lm::google::GoogleNGramReader;
use crate::lm::retriever::SentenceRetriever;
use crate::lm::trie::CountTrie;
use crate::lm::{
    LanguageModel, WordId, WordIndexer, END_SYMBOL, INVALID_CONTEXT_OFFSET, START_SYMBOL,
};

/// Counts n-grams and assigns word ids in order of first occurrence.
///
/// The sentence markers always get ids 0 and 1.
#[derive(Debug)]
pub struct LanguageModelBuilder {
    order: usize,
    trie: CountTrie,
    words: Vec<String>,
    ids: HashMap<String, WordId>,
}

impl LanguageModelBuilder {
    /// Creates a builder of a model of the given order.
    ///
    /// # Errors
    ///
    /// [`SuggestError::InvalidConfig`] is returned when `order` is not in
    /// `1..=255`.
    pub fn new(order: usize) -> Result<Self> {
        if order == 0 || order > usize::from(u8::MAX) {
            return Err(SuggestError::invalid_config(
                "order",
                "must be in 1..=255",
            ));
        }
        let mut builder = Self {
            order,
            trie: CountTrie::default(),
            words: vec![],
            ids: HashMap::new(),
        };
        builder.word_id(START_SYMBOL)?;
        builder.word_id(END_SYMBOL)?;
        Ok(builder)
    }

    /// Counts the sentences of a corpus.
    pub fn from_sentences<R>(retriever: SentenceRetriever<R>, order: usize) -> Result<Self>
    where
        R: BufRead,
    {
        let mut builder = Self::new(order)?;
        let mut num_sentences = 0;
        for sentence in retriever {
            builder.add_sentence(&sentence?)?;
            num_sentences += 1;
        }
        tracing::info!(num_sentences, num_words = builder.words.len(), "corpus counted");
        Ok(builder)
    }

    /// Loads the files `1-gm` to `{order}-gm` of a directory.
    pub fn from_google_ngrams<P>(dir: P, order: usize) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let mut builder = Self::new(order)?;
        GoogleNGramReader::new(dir.as_ref(), order).read_into(&mut builder)?;
        tracing::info!(num_words = builder.words.len(), "ngrams loaded");
        Ok(builder)
    }

    /// Gets the order.
    pub fn order(&self) -> usize {
        self.order
    }

    fn word_id(&mut self, token: &str) -> Result<WordId> {
        if let Some(&id) = self.ids.get(token) {
            return Ok(id);
        }
        let id = WordId::try_from(self.words.len())?;
        if id >= INVALID_CONTEXT_OFFSET {
            return Err(SuggestError::invalid_config(
                "vocabulary",
                "too many words",
            ));
        }
        self.words.push(token.to_string());
        self.ids.insert(token.to_string(), id);
        Ok(id)
    }

    /// Counts every window of `1..=order` words of the sentence wrapped in
    /// the sentence markers.
    pub fn add_sentence<S>(&mut self, sentence: &[S]) -> Result<()>
    where
        S: AsRef<str>,
    {
        let mut ids = Vec::with_capacity(sentence.len() + 2);
        ids.push(self.word_id(START_SYMBOL)?);
        for token in sentence {
            ids.push(self.word_id(token.as_ref())?);
        }
        ids.push(self.word_id(END_SYMBOL)?);
        for k in 1..=self.order {
            for window in ids.windows(k) {
                self.trie.add(window, 1);
            }
        }
        Ok(())
    }

    /// Adds `count` occurrences of one n-gram.
    ///
    /// # Errors
    ///
    /// [`SuggestError::InvalidFormat`] is returned when the n-gram is empty
    /// or longer than the order.
    pub fn add_ngram<S>(&mut self, tokens: &[S], count: u64) -> Result<()>
    where
        S: AsRef<str>,
    {
        if tokens.is_empty() || tokens.len() > self.order {
            return Err(SuggestError::invalid_format(
                "ngram",
                format!("length must be in 1..={}", self.order),
            ));
        }
        let ids = tokens
            .iter()
            .map(|token| self.word_id(token.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        self.trie.add(&ids, count);
        Ok(())
    }

    /// Packs the counts and builds the hash of the vocabulary.
    ///
    /// Returns the model and its vocabulary, which has to be saved next to
    /// the model.
    pub fn build(self) -> Result<(LanguageModel, Arc<InMemoryDictionary>)> {
        let vectors = self.trie.into_vectors(self.order)?;
        let dictionary = Arc::new(InMemoryDictionary::new(self.words));
        let indexer = WordIndexer::build(dictionary.clone())?;
        let model = LanguageModel::new(self.order, vectors, indexer)?;
        Ok((model, dictionary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::Dictionary;

    #[test]
    fn test_markers_first() {
        let mut builder = LanguageModelBuilder::new(2).unwrap();
        builder.add_sentence(&["b", "a"]).unwrap();
        let (_, dict) = builder.build().unwrap();
        assert_eq!(dict.size(), 4);
        assert_eq!(dict.value(0), Some(START_SYMBOL));
        assert_eq!(dict.value(1), Some(END_SYMBOL));
        assert_eq!(dict.value(2), Some("b"));
    }

    #[test]
    fn test_invalid() {
        assert!(LanguageModelBuilder::new(0).is_err());
        assert!(LanguageModelBuilder::new(256).is_err());
        let mut builder = LanguageModelBuilder::new(2).unwrap();
        assert!(builder.add_ngram(&["a", "b", "c"], 1).is_err());
        assert!(builder.add_ngram::<&str>(&[], 1).is_err());
    }
}
