use std::collections::BTreeMap;

use hashbrown::HashSet;

use super::{HeaderBody, TermDescriptor, INDEX_VERSION};
use crate::codec::PostingCodec;
use crate::common::bincode_config;
use crate::errors::Result;
use crate::store::Directory;

/// Accumulates documents and persists the indices on commit.
pub struct IndexWriter<'a> {
    directory: &'a dyn Directory,
    header_name: String,
    documents_name: String,
    // Position 0 is the union of the others.
    indices: Vec<BTreeMap<String, Vec<u32>>>,
}

impl<'a> IndexWriter<'a> {
    /// Creates a writer persisting into the two named files of `directory`.
    pub fn new(directory: &'a dyn Directory, header_name: &str, documents_name: &str) -> Self {
        Self {
            directory,
            header_name: header_name.to_string(),
            documents_name: documents_name.to_string(),
            indices: vec![BTreeMap::new()],
        }
    }

    /// Adds a document given its terms.
    ///
    /// The cardinality is the number of unique terms; a document without
    /// terms is not indexed.
    pub fn add_document<S>(&mut self, id: u32, terms: &[S])
    where
        S: AsRef<str>,
    {
        let unique: HashSet<&str> = terms.iter().map(AsRef::as_ref).collect();
        let cardinality = unique.len();
        if cardinality == 0 {
            return;
        }
        if self.indices.len() <= cardinality {
            self.indices.resize_with(cardinality + 1, BTreeMap::new);
        }
        for term in unique {
            for c in [0, cardinality] {
                self.indices[c]
                    .entry(term.to_string())
                    .or_default()
                    .push(id);
            }
        }
    }

    /// Writes the document-list file and then the header.
    ///
    /// # Errors
    ///
    /// [`SuggestError`](crate::errors::SuggestError) is returned when writing
    /// fails.
    pub fn commit(mut self) -> Result<()> {
        let mut terms = vec![];
        let mut offset = 0u64;
        let mut out = self.directory.create_output(&self.documents_name)?;
        for (cardinality, index) in self.indices.iter_mut().enumerate() {
            for (term, list) in index.iter_mut() {
                list.sort_unstable();
                list.dedup();
                let size = PostingCodec::for_len(list.len()).encode(list, &mut out)?;
                terms.push(TermDescriptor {
                    term: term.clone(),
                    cardinality: u32::try_from(cardinality)?,
                    size: u32::try_from(size)?,
                    offset,
                    len: u32::try_from(list.len())?,
                });
                offset += size as u64;
            }
        }
        out.close()?;

        let body = HeaderBody {
            num_cardinalities: u32::try_from(self.indices.len())?,
            terms,
        };
        let mut out = self.directory.create_output(&self.header_name)?;
        bincode::encode_into_std_write(INDEX_VERSION, &mut out, bincode_config())?;
        bincode::encode_into_std_write(&body, &mut out, bincode_config())?;
        out.close()?;

        tracing::info!(
            header = %self.header_name,
            num_cardinalities = body.num_cardinalities,
            num_terms = body.terms.len(),
            bytes = offset,
            "index committed"
        );
        Ok(())
    }
}
