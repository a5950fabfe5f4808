//! Query drivers over the inverted indices.
mod autocomplete;
mod config;
mod fuzzy;
mod topk;

pub use autocomplete::AutocompleteSearcher;
pub use config::SearchConfig;
pub use fuzzy::FuzzySearcher;
pub use topk::{Ranked, TopKQueue};
