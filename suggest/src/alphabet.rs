//! Character classes that decide which characters survive normalization.
use std::fmt;

use hashbrown::HashSet;

use crate::errors::{Result, SuggestError};

/// A set of characters.
pub trait Alphabet: Send + Sync + fmt::Debug {
    /// Checks if the alphabet contains the character.
    fn has(&self, c: char) -> bool;

    /// Maps a member character to its canonical form.
    #[inline(always)]
    fn fold(&self, c: char) -> char {
        c
    }
}

/// A contiguous range of Unicode scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeAlphabet {
    from: char,
    to: char,
}

impl RangeAlphabet {
    /// Creates an alphabet of the inclusive range `from..=to`.
    pub const fn new(from: char, to: char) -> Self {
        Self { from, to }
    }

    /// Latin letters `a-z`.
    pub const fn english() -> Self {
        Self::new('a', 'z')
    }

    /// Decimal digits `0-9`.
    pub const fn numbers() -> Self {
        Self::new('0', '9')
    }
}

impl Alphabet for RangeAlphabet {
    #[inline(always)]
    fn has(&self, c: char) -> bool {
        self.from <= c && c <= self.to
    }
}

/// Cyrillic letters `а-я`, with `ё` folded into `е`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RussianAlphabet;

impl Alphabet for RussianAlphabet {
    #[inline(always)]
    fn has(&self, c: char) -> bool {
        ('а'..='я').contains(&c) || c == 'ё'
    }

    #[inline(always)]
    fn fold(&self, c: char) -> char {
        if c == 'ё' {
            'е'
        } else {
            c
        }
    }
}

/// An arbitrary set of characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleAlphabet {
    chars: HashSet<char>,
}

impl SimpleAlphabet {
    /// Creates an alphabet from the characters of `chars`.
    pub fn new(chars: &str) -> Self {
        Self {
            chars: chars.chars().collect(),
        }
    }
}

impl Alphabet for SimpleAlphabet {
    #[inline(always)]
    fn has(&self, c: char) -> bool {
        self.chars.contains(&c)
    }
}

/// The union of several alphabets.
#[derive(Debug, Default)]
pub struct CompositeAlphabet {
    children: Vec<Box<dyn Alphabet>>,
}

impl CompositeAlphabet {
    /// Creates a composite alphabet.
    pub fn new(children: Vec<Box<dyn Alphabet>>) -> Self {
        Self { children }
    }

    /// Builds an alphabet from description entries.
    ///
    /// Each entry is either a reserved name (`english`, `russian`, `numbers`)
    /// or a raw string whose characters are added as a set.
    ///
    /// # Errors
    ///
    /// [`SuggestError`] is returned when no entry is given.
    pub fn from_names<S>(names: &[S]) -> Result<Self>
    where
        S: AsRef<str>,
    {
        if names.is_empty() {
            return Err(SuggestError::invalid_config(
                "alphabet",
                "at least one alphabet must be given",
            ));
        }
        let children = names
            .iter()
            .map(|name| -> Box<dyn Alphabet> {
                match name.as_ref() {
                    "english" => Box::new(RangeAlphabet::english()),
                    "russian" => Box::new(RussianAlphabet),
                    "numbers" => Box::new(RangeAlphabet::numbers()),
                    chars => Box::new(SimpleAlphabet::new(chars)),
                }
            })
            .collect();
        Ok(Self::new(children))
    }
}

impl Alphabet for CompositeAlphabet {
    #[inline(always)]
    fn has(&self, c: char) -> bool {
        self.children.iter().any(|a| a.has(c))
    }

    fn fold(&self, c: char) -> char {
        self.children
            .iter()
            .find(|a| a.has(c))
            .map_or(c, |a| a.fold(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        let english = RangeAlphabet::english();
        assert!(english.has('a'));
        assert!(english.has('z'));
        assert!(!english.has('A'));
        assert!(!english.has('$'));

        let numbers = RangeAlphabet::numbers();
        assert!(numbers.has('7'));
        assert!(!numbers.has('a'));
    }

    #[test]
    fn test_russian_fold() {
        let russian = RussianAlphabet;
        assert!(russian.has('ж'));
        assert!(russian.has('ё'));
        assert!(!russian.has('z'));
        assert_eq!(russian.fold('ё'), 'е');
        assert_eq!(russian.fold('ж'), 'ж');
    }

    #[test]
    fn test_composite() {
        let alphabet = CompositeAlphabet::from_names(&["english", "russian", "$-"]).unwrap();
        assert!(alphabet.has('q'));
        assert!(alphabet.has('ё'));
        assert!(alphabet.has('$'));
        assert!(alphabet.has('-'));
        assert!(!alphabet.has('7'));
        assert_eq!(alphabet.fold('ё'), 'е');
    }

    #[test]
    #[should_panic]
    fn test_composite_empty() {
        let names: [&str; 0] = [];
        CompositeAlphabet::from_names(&names).unwrap();
    }
}
