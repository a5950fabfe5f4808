//! Id to value stores that indices are built from.
use std::io::{BufRead, Write};

use crate::errors::{Result, SuggestError};

/// A read-only store mapping dense ids to the original strings.
pub trait Dictionary: Send + Sync {
    /// Gets the value of `id`.
    fn get(&self, id: u32) -> Result<Option<String>>;

    /// Calls `f` for every entry in id order; an error stops the iteration.
    fn iterate(&self, f: &mut dyn FnMut(u32, &str) -> Result<()>) -> Result<()>;

    /// Gets the number of entries.
    fn size(&self) -> usize;
}

/// A dictionary kept in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryDictionary {
    values: Vec<String>,
}

impl InMemoryDictionary {
    /// Creates a dictionary whose ids follow the order of `values`.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Reads a dictionary holding one value per line; blank lines are skipped.
    ///
    /// # Errors
    ///
    /// [`SuggestError`] is returned when reading fails or the number of
    /// entries exceeds the id space.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: BufRead,
    {
        let mut values = vec![];
        let mut num_skipped = 0;
        for line in rdr.lines() {
            let line = line?;
            let value = line.trim();
            if value.is_empty() {
                num_skipped += 1;
                continue;
            }
            values.push(value.to_string());
        }
        if num_skipped != 0 {
            tracing::warn!(num_skipped, "blank dictionary lines skipped");
        }
        if u32::try_from(values.len()).is_err() {
            return Err(SuggestError::invalid_format(
                "dictionary",
                "too many entries",
            ));
        }
        Ok(Self { values })
    }

    /// Writes one value per line.
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        for value in &self.values {
            writeln!(wtr, "{value}")?;
        }
        Ok(())
    }

    /// Gets the value of `id` without copying.
    #[inline(always)]
    pub fn value(&self, id: u32) -> Option<&str> {
        self.values.get(id as usize).map(String::as_str)
    }
}

impl Dictionary for InMemoryDictionary {
    fn get(&self, id: u32) -> Result<Option<String>> {
        Ok(self.value(id).map(str::to_string))
    }

    fn iterate(&self, f: &mut dyn FnMut(u32, &str) -> Result<()>) -> Result<()> {
        for (id, value) in self.values.iter().enumerate() {
            f(u32::try_from(id)?, value)?;
        }
        Ok(())
    }

    fn size(&self) -> usize {
        self.values.len()
    }
}
