use hashbrown::HashMap;

use super::{HeaderBody, INDEX_VERSION};
use crate::codec::{Decoder, PostingCodec, VarintDecoder};
use crate::common::bincode_config;
use crate::errors::{Result, SuggestError};
use crate::posting::{PostingListIter, SkipIterator, SliceIterator};
use crate::store::{Directory, Input};
use crate::utils::FromU32;

#[derive(Debug, Clone, Copy)]
struct PostingDescriptor {
    offset: usize,
    size: usize,
    len: usize,
}

/// One level of the indices: a map from terms to posting lists.
#[derive(Debug)]
pub struct InvertedIndex {
    terms: HashMap<String, PostingDescriptor>,
    documents: Input,
}

impl InvertedIndex {
    /// Gets the number of terms.
    #[inline(always)]
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Checks if the term is present.
    #[inline(always)]
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// Gets the posting list of the term.
    ///
    /// # Errors
    ///
    /// [`SuggestError`] is returned when the list cannot be decoded.
    pub fn posting_list(&self, term: &str) -> Result<Option<PostingListIter<'_>>> {
        let Some(desc) = self.terms.get(term) else {
            return Ok(None);
        };
        let bytes = &self.documents.as_bytes()[desc.offset..desc.offset + desc.size];
        let it = match PostingCodec::for_len(desc.len) {
            PostingCodec::Skip => PostingListIter::Skip(SkipIterator::new(bytes, desc.len)?),
            PostingCodec::Varint => {
                let mut list = vec![0; desc.len];
                VarintDecoder::default().decode(bytes, &mut list)?;
                PostingListIter::Slice(SliceIterator::new(list))
            }
        };
        Ok(Some(it))
    }
}

/// Indices `I[0] … I[C_max]` opened from a directory.
///
/// The document-list bytes stay mapped as long as the indices live.
#[derive(Debug)]
pub struct InvertedIndices {
    indices: Vec<InvertedIndex>,
}

impl InvertedIndices {
    /// Opens the indices persisted by [`IndexWriter`](super::IndexWriter).
    ///
    /// # Errors
    ///
    /// [`SuggestError`] is returned when the files cannot be read, the
    /// version does not match, or a descriptor points out of the
    /// document-list file.
    pub fn open(directory: &dyn Directory, header_name: &str, documents_name: &str) -> Result<Self> {
        let header = directory.open_input(header_name)?;
        let bytes = header.as_bytes();
        let (version, read): (String, usize) =
            bincode::decode_from_slice(bytes, bincode_config())?;
        if version != INDEX_VERSION {
            return Err(SuggestError::IndexVersionMismatch {
                expected: INDEX_VERSION.to_string(),
                found: version,
            });
        }
        let (body, _): (HeaderBody, usize) =
            bincode::decode_from_slice(&bytes[read..], bincode_config())?;

        let documents = directory.open_input(documents_name)?;
        let num_cardinalities = usize::from_u32(body.num_cardinalities);
        let mut maps: Vec<HashMap<String, PostingDescriptor>> =
            (0..num_cardinalities).map(|_| HashMap::new()).collect();
        let num_terms = body.terms.len();
        for desc in body.terms {
            let cardinality = usize::from_u32(desc.cardinality);
            let offset = usize::try_from(desc.offset)?;
            let size = usize::from_u32(desc.size);
            let len = usize::from_u32(desc.len);
            if offset.checked_add(size).map_or(true, |end| end > documents.len()) {
                return Err(SuggestError::invalid_codec(format!(
                    "posting list of {:?} exceeds the document-list file",
                    desc.term
                )));
            }
            let map = maps.get_mut(cardinality).ok_or_else(|| {
                SuggestError::invalid_codec(format!(
                    "cardinality {cardinality} exceeds the header count"
                ))
            })?;
            map.insert(desc.term, PostingDescriptor { offset, size, len });
        }

        tracing::info!(
            header = header_name,
            num_cardinalities,
            num_terms,
            "index opened"
        );
        let indices = maps
            .into_iter()
            .map(|terms| InvertedIndex {
                terms,
                documents: documents.clone(),
            })
            .collect();
        Ok(Self { indices })
    }

    /// Gets `I[cardinality]`; position 0 is the union index.
    #[inline(always)]
    pub fn get(&self, cardinality: usize) -> Option<&InvertedIndex> {
        self.indices.get(cardinality)
    }

    /// Gets the largest document cardinality `C_max`.
    #[inline(always)]
    pub fn max_cardinality(&self) -> usize {
        self.indices.len().saturating_sub(1)
    }
}
