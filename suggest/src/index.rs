//! Cardinality-partitioned n-gram inverted indices.
//!
//! `I[0]` maps every term to all documents containing it; `I[c]` for `c ≥ 1`
//! only holds documents with exactly `c` unique terms. Two files are
//! persisted: a header listing a descriptor per (cardinality, term), and a
//! document-list file with the concatenated encoded posting lists.
mod reader;
mod writer;

use bincode::{Decode, Encode};

use crate::dictionary::Dictionary;
use crate::errors::Result;
use crate::tokenizer::NGramTokenizer;

pub use reader::{InvertedIndex, InvertedIndices};
pub use writer::IndexWriter;

/// Version tag written at the head of the index header.
pub const INDEX_VERSION: &str = "v5";

#[derive(Debug, Decode, Encode)]
struct HeaderBody {
    num_cardinalities: u32,
    terms: Vec<TermDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode)]
struct TermDescriptor {
    term: String,
    cardinality: u32,
    size: u32,
    offset: u64,
    len: u32,
}

/// Tokenizes every entry of the dictionary into the writer and commits.
///
/// # Errors
///
/// [`SuggestError`](crate::errors::SuggestError) is returned when the
/// dictionary or the directory fails.
pub fn build_index(
    dictionary: &dyn Dictionary,
    tokenizer: &NGramTokenizer,
    mut writer: IndexWriter,
) -> Result<()> {
    let mut terms = vec![];
    dictionary.iterate(&mut |id, value| {
        tokenizer.tokenize_into(value, &mut terms);
        writer.add_document(id, &terms);
        Ok(())
    })?;
    writer.commit()
}
