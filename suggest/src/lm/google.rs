use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::errors::{Result, SuggestError};
use crate::lm::builder::LanguageModelBuilder;

/// Reader of n-gram counts in the Google Web 1T layout.
///
/// The directory holds one file per order, `1-gm` to `{order}-gm`, with
/// lines `w1 w2 … wk<TAB>count`.
#[derive(Debug, Clone)]
pub struct GoogleNGramReader {
    dir: PathBuf,
    order: usize,
}

impl GoogleNGramReader {
    /// Creates a reader.
    pub fn new<P>(dir: P, order: usize) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            dir: dir.into(),
            order,
        }
    }

    /// Gets the path of the file of order `k`.
    pub fn file_path(&self, k: usize) -> PathBuf {
        self.dir.join(format!("{k}-gm"))
    }

    /// Feeds every file to the builder, lowest order first.
    pub fn read_into(&self, builder: &mut LanguageModelBuilder) -> Result<()> {
        for k in 1..=self.order {
            let path = self.file_path(k);
            let rdr = BufReader::new(File::open(&path)?);
            let num_ngrams = read_ngrams(rdr, k, builder)?;
            tracing::debug!(path = %path.display(), num_ngrams, "ngram file read");
        }
        Ok(())
    }

    /// Gets the directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Feeds the `k`-grams of one file to the builder and returns their number.
///
/// # Errors
///
/// [`SuggestError::InvalidFormat`] is returned for a line without a tab, a
/// count that is not an integer or an n-gram of another length.
pub fn read_ngrams<R>(rdr: R, k: usize, builder: &mut LanguageModelBuilder) -> Result<usize>
where
    R: BufRead,
{
    let mut num_ngrams = 0;
    for (i, line) in rdr.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Some((ngram, count)) = line.rsplit_once('\t') else {
            return Err(SuggestError::invalid_format(
                "ngram file",
                format!("line {}: missing tab", i + 1),
            ));
        };
        let count: u64 = count.trim().parse().map_err(|_| {
            SuggestError::invalid_format("ngram file", format!("line {}: invalid count", i + 1))
        })?;
        let tokens: Vec<&str> = ngram.split_whitespace().collect();
        if tokens.len() != k {
            return Err(SuggestError::invalid_format(
                "ngram file",
                format!("line {}: expected {k} tokens, found {}", i + 1, tokens.len()),
            ));
        }
        builder.add_ngram(&tokens, count)?;
        num_ngrams += 1;
    }
    Ok(num_ngrams)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_ngrams() {
        let mut builder = LanguageModelBuilder::new(2).unwrap();
        assert_eq!(read_ngrams("a\t3\nb\t1\n\n".as_bytes(), 1, &mut builder).unwrap(), 2);
        assert_eq!(read_ngrams("a b\t1\n".as_bytes(), 2, &mut builder).unwrap(), 1);
    }

    #[test]
    fn test_malformed() {
        let mut builder = LanguageModelBuilder::new(2).unwrap();
        assert!(read_ngrams("a 3\n".as_bytes(), 1, &mut builder).is_err());
        assert!(read_ngrams("a\tx\n".as_bytes(), 1, &mut builder).is_err());
        assert!(read_ngrams("a b\t1\n".as_bytes(), 1, &mut builder).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = LanguageModelBuilder::new(1).unwrap();
        let reader = GoogleNGramReader::new(dir.path(), 1);
        assert_eq!(reader.file_path(1), dir.path().join("1-gm"));
        assert!(matches!(
            reader.read_into(&mut builder),
            Err(SuggestError::StdIo(_))
        ));
    }
}
