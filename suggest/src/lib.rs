//! # suggest
//!
//! Approximate string search and autocomplete over n-gram inverted indices.
//!
//! Documents of a [`Dictionary`] are split into character n-grams and indexed
//! by their number of distinct n-grams. A fuzzy query visits the candidate
//! cardinalities a similarity [`Metric`] allows, merges the posting lists of
//! its n-grams and keeps the best documents; an autocomplete query intersects
//! the posting lists of a prefix.
//!
//! ```
//! use std::sync::Arc;
//!
//! use suggest::description::{Driver, IndexDescription};
//! use suggest::dictionary::InMemoryDictionary;
//! use suggest::store::RamDirectory;
//! use suggest::{Metric, NGramIndex, SearchConfig};
//!
//! let description = IndexDescription {
//!     driver: Driver::Ram,
//!     name: "cars".into(),
//!     ngram_size: 3,
//!     source: "cars.txt".into(),
//!     output: Default::default(),
//!     alphabet: vec!["english".into()],
//!     pad: "$".into(),
//!     wrap: ["$".into(), "$".into()],
//! };
//! let dictionary = Arc::new(InMemoryDictionary::new(["Nissan March", "Toyota Corona"]));
//! let index = NGramIndex::build(description, dictionary, &RamDirectory::new()).unwrap();
//!
//! let config = SearchConfig::new("nissan mrch", 5, Metric::Jaccard, 0.5).unwrap();
//! let suggestions = index.suggest(&config).unwrap();
//! assert_eq!(suggestions[0].value, "Nissan March");
//!
//! let completions = index.autocomplete("toyo", 5).unwrap();
//! assert_eq!(completions[0].value, "Toyota Corona");
//! ```
#![deny(missing_docs)]

#[cfg(target_pointer_width = "16")]
compile_error!("`target_pointer_width` must be larger than or equal to 32");

pub mod alphabet;
pub mod codec;
pub mod common;
pub mod description;
pub mod dictionary;
pub mod errors;
pub mod index;
pub mod lm;
pub mod merger;
pub mod metric;
pub mod mph;
pub mod posting;
pub mod search;
pub mod service;
pub mod spellchecker;
pub mod store;
pub mod tokenizer;
mod utils;

#[cfg(test)]
mod tests;

pub use dictionary::Dictionary;
pub use lm::LanguageModel;
pub use metric::Metric;
pub use search::SearchConfig;
pub use service::{NGramIndex, SuggestService, Suggestion};
pub use spellchecker::SpellChecker;
