//! Registry of named indices served concurrently.
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::Serialize;

use crate::description::{Driver, IndexDescription};
use crate::dictionary::{Dictionary, InMemoryDictionary};
use crate::errors::{Result, SuggestError};
use crate::index::{build_index, IndexWriter, InvertedIndices};
use crate::merger::MergerKind;
use crate::search::{AutocompleteSearcher, FuzzySearcher, Ranked, SearchConfig};
use crate::store::{Directory, FsDirectory, RamDirectory};

/// A search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// Similarity, or 0 for autocomplete results.
    pub score: f64,

    /// Dictionary value.
    pub value: String,
}

/// A dictionary with its opened indices and searchers.
pub struct NGramIndex {
    description: IndexDescription,
    indices: InvertedIndices,
    dictionary: Arc<dyn Dictionary>,
    fuzzy: FuzzySearcher,
    autocomplete: AutocompleteSearcher,
}

impl NGramIndex {
    /// Builds the indices of `dictionary` into `directory` and opens them.
    ///
    /// # Errors
    ///
    /// [`SuggestError`] is returned when the description is invalid or the
    /// directory fails.
    pub fn build(
        description: IndexDescription,
        dictionary: Arc<dyn Dictionary>,
        directory: &dyn Directory,
    ) -> Result<Self> {
        description.validate()?;
        let tokenizer = description.fuzzy_tokenizer()?;
        let writer = IndexWriter::new(
            directory,
            &description.header_file(),
            &description.documents_file(),
        );
        build_index(dictionary.as_ref(), &tokenizer, writer)?;
        Self::open(description, dictionary, directory)
    }

    /// Opens indices built before.
    ///
    /// # Errors
    ///
    /// [`SuggestError`] is returned when the description is invalid or the
    /// index files cannot be opened.
    pub fn open(
        description: IndexDescription,
        dictionary: Arc<dyn Dictionary>,
        directory: &dyn Directory,
    ) -> Result<Self> {
        description.validate()?;
        let indices = InvertedIndices::open(
            directory,
            &description.header_file(),
            &description.documents_file(),
        )?;
        let fuzzy = FuzzySearcher::new(description.fuzzy_tokenizer()?);
        let autocomplete = AutocompleteSearcher::new(description.autocomplete_tokenizer()?);
        Ok(Self {
            description,
            indices,
            dictionary,
            fuzzy,
            autocomplete,
        })
    }

    /// Builds the index a description names from its source file.
    ///
    /// The `RAM` driver builds into memory; `DISC` builds into the output
    /// directory.
    pub fn from_description(description: IndexDescription) -> Result<Self> {
        let rdr = BufReader::new(File::open(&description.source)?);
        let dictionary: Arc<dyn Dictionary> = Arc::new(InMemoryDictionary::from_reader(rdr)?);
        match description.driver {
            Driver::Ram => Self::build(description, dictionary, &RamDirectory::new()),
            Driver::Disc => {
                let directory = FsDirectory::new(&description.output)?;
                Self::build(description, dictionary, &directory)
            }
        }
    }

    /// Sets the merger of fuzzy search.
    pub fn with_merger(mut self, merger: MergerKind) -> Self {
        self.fuzzy = self.fuzzy.merger(merger);
        self
    }

    /// Gets the description.
    pub fn description(&self) -> &IndexDescription {
        &self.description
    }

    /// Gets the opened indices.
    pub fn indices(&self) -> &InvertedIndices {
        &self.indices
    }

    /// Gets the dictionary.
    pub fn dictionary(&self) -> &dyn Dictionary {
        self.dictionary.as_ref()
    }

    /// Runs a fuzzy search and returns document ids with scores.
    pub fn fuzzy_search(&self, config: &SearchConfig) -> Result<Vec<Ranked>> {
        self.fuzzy.search(&self.indices, config)
    }

    /// Runs an autocomplete search and returns document ids.
    pub fn autocomplete_search(&self, query: &str, top_k: usize) -> Result<Vec<Ranked>> {
        self.autocomplete.search(&self.indices, query, top_k)
    }

    /// Runs a fuzzy search and resolves the values.
    pub fn suggest(&self, config: &SearchConfig) -> Result<Vec<Suggestion>> {
        self.resolve(self.fuzzy_search(config)?)
    }

    /// Runs an autocomplete search and resolves the values.
    pub fn autocomplete(&self, query: &str, top_k: usize) -> Result<Vec<Suggestion>> {
        self.resolve(self.autocomplete_search(query, top_k)?)
    }

    fn resolve(&self, ranked: Vec<Ranked>) -> Result<Vec<Suggestion>> {
        let mut suggestions = Vec::with_capacity(ranked.len());
        for r in ranked {
            match self.dictionary.get(r.position)? {
                Some(value) => suggestions.push(Suggestion {
                    score: r.score,
                    value,
                }),
                None => tracing::warn!(position = r.position, "document missing in dictionary"),
            }
        }
        Ok(suggestions)
    }
}

/// Named indices behind a read-write lock.
///
/// Requests clone the handle of their index under a shared lock; reindexing
/// builds off to the side and swaps the handle under a short exclusive lock.
#[derive(Default)]
pub struct SuggestService {
    registry: RwLock<HashMap<String, Arc<NGramIndex>>>,
}

impl SuggestService {
    /// Creates an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an index, replacing one of the same name.
    pub fn register(&self, index: NGramIndex) {
        let name = index.description.name.clone();
        tracing::info!(name = %name, "index registered");
        self.registry.write().insert(name, Arc::new(index));
    }

    /// Builds the index a description names and registers it.
    pub fn add_dictionary(&self, description: IndexDescription) -> Result<()> {
        self.register(NGramIndex::from_description(description)?);
        Ok(())
    }

    /// Rebuilds a registered index from its description and swaps it in.
    pub fn reindex(&self, name: &str) -> Result<()> {
        let description = self.index(name)?.description.clone();
        let index = NGramIndex::from_description(description)?;
        self.registry.write().insert(name.to_string(), Arc::new(index));
        tracing::info!(name, "index swapped");
        Ok(())
    }

    /// Gets a registered index.
    ///
    /// # Errors
    ///
    /// [`SuggestError::DictionaryMissing`] is returned for unknown names.
    pub fn index(&self, name: &str) -> Result<Arc<NGramIndex>> {
        self.registry
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| SuggestError::DictionaryMissing(name.to_string()))
    }

    /// Gets the registered names in lexical order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.registry.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Fuzzy search in the named index.
    pub fn suggest(&self, name: &str, config: &SearchConfig) -> Result<Vec<Suggestion>> {
        self.index(name)?.suggest(config)
    }

    /// Autocomplete in the named index.
    pub fn autocomplete(&self, name: &str, query: &str, top_k: usize) -> Result<Vec<Suggestion>> {
        self.index(name)?.autocomplete(query, top_k)
    }
}
