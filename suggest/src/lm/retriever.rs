use std::io::BufRead;

use crate::alphabet::Alphabet;
use crate::errors::{Result, SuggestError};

/// Streams sentences out of a text.
///
/// Characters of the token alphabet form words, separator characters end
/// sentences, and anything else only splits words. Words are lowercased and
/// folded by the token alphabet.
pub struct SentenceRetriever<R> {
    rdr: R,
    tokens: Box<dyn Alphabet>,
    separators: Box<dyn Alphabet>,
    line: String,
    pos: usize,
    word: String,
    sentence: Vec<String>,
}

impl<R> SentenceRetriever<R>
where
    R: BufRead,
{
    /// Creates a retriever.
    pub fn new(rdr: R, tokens: Box<dyn Alphabet>, separators: Box<dyn Alphabet>) -> Self {
        Self {
            rdr,
            tokens,
            separators,
            line: String::new(),
            pos: 0,
            word: String::new(),
            sentence: vec![],
        }
    }

    /// Gets the next non-empty sentence, or [`None`] at the end of the text.
    ///
    /// # Errors
    ///
    /// [`SuggestError`] is returned when reading fails or the text is not
    /// UTF-8.
    pub fn retrieve(&mut self) -> Result<Option<Vec<String>>> {
        loop {
            if self.pos >= self.line.len() {
                self.line.clear();
                self.pos = 0;
                let read = self.rdr.read_line(&mut self.line).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::InvalidData {
                        SuggestError::invalid_format("corpus", "text is not UTF-8")
                    } else {
                        e.into()
                    }
                })?;
                if read == 0 {
                    if !self.word.is_empty() {
                        self.sentence.push(std::mem::take(&mut self.word));
                    }
                    if self.sentence.is_empty() {
                        return Ok(None);
                    }
                    return Ok(Some(std::mem::take(&mut self.sentence)));
                }
            }

            let rest = &self.line[self.pos..];
            let mut end = None;
            for (i, c) in rest.char_indices() {
                let mut in_word = false;
                for c in c.to_lowercase() {
                    if self.tokens.has(c) {
                        self.word.push(self.tokens.fold(c));
                        in_word = true;
                    }
                }
                if in_word {
                    continue;
                }
                if !self.word.is_empty() {
                    self.sentence.push(std::mem::take(&mut self.word));
                }
                if self.separators.has(c) && !self.sentence.is_empty() {
                    end = Some(i + c.len_utf8());
                    break;
                }
            }
            match end {
                Some(end) => {
                    self.pos += end;
                    return Ok(Some(std::mem::take(&mut self.sentence)));
                }
                None => self.pos = self.line.len(),
            }
        }
    }
}

impl<R> Iterator for SentenceRetriever<R>
where
    R: BufRead,
{
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.retrieve().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::alphabet::{RangeAlphabet, SimpleAlphabet};

    fn retriever(text: &str) -> SentenceRetriever<&[u8]> {
        SentenceRetriever::new(
            text.as_bytes(),
            Box::new(RangeAlphabet::english()),
            Box::new(SimpleAlphabet::new(".!?")),
        )
    }

    #[test]
    fn test_retrieve() {
        let sentences: Vec<_> = retriever("I am Sam. Sam I am!\nI do not\nlike green eggs, and ham?")
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            sentences,
            vec![
                vec!["i", "am", "sam"],
                vec!["sam", "i", "am"],
                vec!["i", "do", "not", "like", "green", "eggs", "and", "ham"],
            ]
        );
    }

    #[test]
    fn test_unterminated_and_empty() {
        let mut r = retriever("...  Hello world");
        assert_eq!(r.retrieve().unwrap(), Some(vec!["hello".into(), "world".into()]));
        assert_eq!(r.retrieve().unwrap(), None);
        assert_eq!(retriever("").retrieve().unwrap(), None);
    }
}
