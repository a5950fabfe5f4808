//! Descriptions of indices to build and serve.
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::alphabet::CompositeAlphabet;
use crate::errors::{Result, SuggestError};
use crate::tokenizer::NGramTokenizer;

/// Where an index lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Driver {
    /// In memory, rebuilt on every start.
    #[serde(rename = "RAM")]
    Ram,

    /// On disk under the output directory, memory mapped when served.
    #[serde(rename = "DISC")]
    Disc,
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Ram => write!(f, "RAM"),
            Self::Disc => write!(f, "DISC"),
        }
    }
}

/// Description of an index.
///
/// ```json
/// {
///   "driver": "DISC",
///   "name": "cars",
///   "nGramSize": 3,
///   "source": "cars.txt",
///   "output": "index",
///   "alphabet": ["english", "$"],
///   "pad": "$",
///   "wrap": ["$", "$"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescription {
    /// Storage of the built index.
    pub driver: Driver,

    /// Name the index is registered under.
    pub name: String,

    /// Number of characters per term.
    #[serde(rename = "nGramSize")]
    pub ngram_size: usize,

    /// Dictionary file, one entry per line.
    pub source: PathBuf,

    /// Directory of the index files for the `DISC` driver.
    #[serde(default)]
    pub output: PathBuf,

    /// Reserved alphabet names or raw character sets.
    pub alphabet: Vec<String>,

    /// Replacement of characters outside of the alphabet.
    pub pad: String,

    /// Left and right wrapping symbols.
    pub wrap: [String; 2],
}

impl IndexDescription {
    /// Reads a JSON array of descriptions.
    ///
    /// # Errors
    ///
    /// [`SuggestError`] is returned when the JSON is malformed or a
    /// description is invalid.
    pub fn from_reader<R>(rdr: R) -> Result<Vec<Self>>
    where
        R: Read,
    {
        let descriptions: Vec<Self> = serde_json::from_reader(rdr)?;
        for description in &descriptions {
            description.validate()?;
        }
        Ok(descriptions)
    }

    /// Checks the values.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(SuggestError::invalid_config("name", "must not be empty"));
        }
        if self.ngram_size == 0 {
            return Err(SuggestError::invalid_config(
                "nGramSize",
                "must be greater than zero",
            ));
        }
        if self.alphabet.is_empty() {
            return Err(SuggestError::invalid_config(
                "alphabet",
                "must not be empty",
            ));
        }
        Ok(())
    }

    /// Creates the tokenizer used to index and fuzzy search.
    pub fn fuzzy_tokenizer(&self) -> Result<NGramTokenizer> {
        let alphabet = CompositeAlphabet::from_names(&self.alphabet[..])?;
        NGramTokenizer::new(
            self.ngram_size,
            Arc::new(alphabet),
            self.pad.clone(),
            self.wrap.clone(),
        )
    }

    /// Creates the tokenizer used to autocomplete.
    pub fn autocomplete_tokenizer(&self) -> Result<NGramTokenizer> {
        Ok(self.fuzzy_tokenizer()?.without_right_wrap())
    }

    /// Gets the file name of the index header.
    pub fn header_file(&self) -> String {
        format!("{}.hd", self.name)
    }

    /// Gets the file name of the document lists.
    pub fn documents_file(&self) -> String {
        format!("{}.dl", self.name)
    }
}
