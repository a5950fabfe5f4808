use std::io::{BufRead, Read, Write};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::errors::{Result, SuggestError};
use crate::lm::{ContextOffset, WordId, INVALID_CONTEXT_OFFSET};
use crate::utils::{self, FromU32};

const RANGE_SIZE: usize = 12;
const VALUE_SIZE: usize = 8;
const MAX_HEADER_LEN: usize = 64;

/// Context of the unigrams.
pub(crate) const ROOT_CONTEXT: ContextOffset = INVALID_CONTEXT_OFFSET;

#[inline(always)]
const fn pack(context: ContextOffset, word: WordId) -> u64 {
    ((context as u64) << 32) | word as u64
}

#[inline(always)]
const fn context_of(key: u64) -> ContextOffset {
    (key >> 32) as u32
}

#[inline(always)]
const fn word_of(key: u64) -> WordId {
    key as u32
}

/// Positions `begin..end` of the entries sharing `context`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ContextRange {
    context: ContextOffset,
    begin: u32,
    end: u32,
}

/// N-grams of one order, packed in a sorted array.
///
/// Each key packs the offset of its prefix in the previous order with the
/// id of its last word, so the entries of one context are contiguous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NGramVector {
    keys: Vec<u64>,
    counts: Vec<u64>,
    ranges: Vec<ContextRange>,
    total: u64,
}

impl NGramVector {
    /// Creates a vector from `(context, word, count)` records.
    pub(crate) fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (ContextOffset, WordId, u64)>,
    {
        let mut records: Vec<(u64, u64)> = records
            .into_iter()
            .map(|(context, word, count)| (pack(context, word), count))
            .collect();
        records.sort_unstable_by_key(|&(key, _)| key);
        if u32::try_from(records.len()).is_err() {
            return Err(SuggestError::invalid_config("ngrams", "too many entries"));
        }
        let (keys, counts) = records.into_iter().unzip();
        Ok(Self::with_ranges(keys, counts))
    }

    fn with_ranges(keys: Vec<u64>, counts: Vec<u64>) -> Self {
        let mut ranges: Vec<ContextRange> = vec![];
        for (i, &key) in keys.iter().enumerate() {
            let context = context_of(key);
            match ranges.last_mut() {
                Some(last) if last.context == context => last.end = i as u32 + 1,
                _ => ranges.push(ContextRange {
                    context,
                    begin: i as u32,
                    end: i as u32 + 1,
                }),
            }
        }
        let total = counts.iter().sum();
        Self {
            keys,
            counts,
            ranges,
            total,
        }
    }

    /// Gets the number of n-grams.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Checks if the vector is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Gets the sum of the counts.
    #[inline(always)]
    pub fn total_count(&self) -> u64 {
        self.total
    }

    /// Gets the count of `word` after `context` and the offset of the found
    /// n-gram, which is the context of its continuations.
    #[inline(always)]
    pub fn get_count(&self, word: WordId, context: ContextOffset) -> Option<(u64, ContextOffset)> {
        let i = self.keys.binary_search(&pack(context, word)).ok()?;
        Some((self.counts[i], i as u32))
    }

    /// Gets the continuations of `context`.
    pub fn sub_vector(&self, context: ContextOffset) -> SubVector<'_> {
        let range = self
            .ranges
            .binary_search_by_key(&context, |r| r.context)
            .map(|i| self.ranges[i])
            .ok();
        let (begin, end) = range.map_or((0, 0), |r| {
            (usize::from_u32(r.begin), usize::from_u32(r.end))
        });
        SubVector {
            keys: &self.keys[begin..end],
            counts: &self.counts[begin..end],
        }
    }

    /// Writes the header line then the ranges, the keys and the counts.
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        writeln!(
            wtr,
            "{} {} {}",
            self.ranges.len() * RANGE_SIZE,
            (self.keys.len() + self.counts.len()) * VALUE_SIZE,
            self.total
        )?;
        for r in &self.ranges {
            wtr.write_u32::<LittleEndian>(r.context)?;
            wtr.write_u32::<LittleEndian>(r.begin)?;
            wtr.write_u32::<LittleEndian>(r.end)?;
        }
        for &key in &self.keys {
            wtr.write_u64::<LittleEndian>(key)?;
        }
        for &count in &self.counts {
            wtr.write_u64::<LittleEndian>(count)?;
        }
        Ok(())
    }

    /// Reads a vector written by [`NGramVector::write`].
    ///
    /// # Errors
    ///
    /// [`SuggestError::InvalidSize`] is returned when a byte size does not
    /// split into whole elements.
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: BufRead,
    {
        let mut line = vec![];
        (&mut rdr)
            .take(MAX_HEADER_LEN as u64)
            .read_until(b'\n', &mut line)?;
        if line.last() != Some(&b'\n') {
            return Err(SuggestError::invalid_format(
                "ngram vector",
                "missing header line",
            ));
        }
        let line = std::str::from_utf8(&line)
            .map_err(|_| SuggestError::invalid_format("ngram vector", "header is not UTF-8"))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [ranges_len, values_len, total] = fields[..] else {
            return Err(SuggestError::invalid_format(
                "ngram vector",
                format!("malformed header: {line:?}"),
            ));
        };
        let ranges_len: usize = ranges_len.parse()?;
        let values_len: usize = values_len.parse()?;
        let total: u64 = total.parse()?;
        if ranges_len % RANGE_SIZE != 0 {
            return Err(SuggestError::InvalidSize {
                what: "range containers",
                len: ranges_len,
            });
        }
        if values_len % (2 * VALUE_SIZE) != 0 {
            return Err(SuggestError::InvalidSize {
                what: "values",
                len: values_len,
            });
        }

        let bytes = utils::read_bytes(&mut rdr, ranges_len, "range containers")?;
        let ranges: Vec<ContextRange> = bytes
            .chunks_exact(RANGE_SIZE)
            .map(|c| ContextRange {
                context: LittleEndian::read_u32(&c[0..4]),
                begin: LittleEndian::read_u32(&c[4..8]),
                end: LittleEndian::read_u32(&c[8..12]),
            })
            .collect();
        let bytes = utils::read_bytes(&mut rdr, values_len, "values")?;
        let (key_bytes, count_bytes) = bytes.split_at(values_len / 2);
        let n = values_len / (2 * VALUE_SIZE);
        let mut keys = vec![0; n];
        LittleEndian::read_u64_into(key_bytes, &mut keys);
        let mut counts = vec![0; n];
        LittleEndian::read_u64_into(count_bytes, &mut counts);

        if keys.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SuggestError::invalid_format(
                "ngram vector",
                "keys are not strictly ascending",
            ));
        }
        let vector = Self::with_ranges(keys, counts);
        if vector.ranges != ranges || vector.total != total {
            return Err(SuggestError::invalid_format(
                "ngram vector",
                "ranges or total count disagree with the values",
            ));
        }
        Ok(vector)
    }
}

/// Continuations of one context.
#[derive(Debug, Clone, Copy)]
pub struct SubVector<'a> {
    keys: &'a [u64],
    counts: &'a [u64],
}

impl<'a> SubVector<'a> {
    /// Gets the number of continuations.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Checks if there is no continuation.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates `(word, count)` in word order.
    pub fn iter(&self) -> impl Iterator<Item = (WordId, u64)> + 'a {
        self.keys
            .iter()
            .zip(self.counts)
            .map(|(&key, &count)| (word_of(key), count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bigrams() -> NGramVector {
        NGramVector::from_records([(3, 7, 2), (1, 5, 1), (3, 2, 4), (1, 9, 3), (0, 1, 1)]).unwrap()
    }

    #[test]
    fn test_get_count() {
        let v = bigrams();
        assert_eq!(v.len(), 5);
        assert_eq!(v.total_count(), 11);
        assert_eq!(v.get_count(1, 0), Some((1, 0)));
        assert_eq!(v.get_count(9, 1), Some((3, 2)));
        assert_eq!(v.get_count(2, 3), Some((4, 3)));
        assert_eq!(v.get_count(9, 3), None);
    }

    #[test]
    fn test_sub_vector() {
        let v = bigrams();
        let sub: Vec<_> = v.sub_vector(3).iter().collect();
        assert_eq!(sub, vec![(2, 4), (7, 2)]);
        let sub: Vec<_> = v.sub_vector(1).iter().collect();
        assert_eq!(sub, vec![(5, 1), (9, 3)]);
        assert!(v.sub_vector(2).is_empty());
    }

    #[test]
    fn test_unigrams_share_the_root_context() {
        let v = NGramVector::from_records([(ROOT_CONTEXT, 1, 3), (ROOT_CONTEXT, 0, 2)]).unwrap();
        assert_eq!(v.sub_vector(ROOT_CONTEXT).len(), 2);
        assert_eq!(v.get_count(1, ROOT_CONTEXT), Some((3, 1)));
    }

    #[test]
    fn test_write_read() {
        let v = bigrams();
        let mut buf = vec![];
        v.write(&mut buf).unwrap();
        assert!(buf.starts_with(b"36 80 11\n"));
        assert_eq!(buf.len(), 9 + 36 + 80);
        let other = NGramVector::read(&buf[..]).unwrap();
        assert_eq!(other, v);
    }

    #[test]
    fn test_read_invalid_size() {
        let mut buf = b"13 80 11\n".to_vec();
        buf.extend([0; 93]);
        assert!(matches!(
            NGramVector::read(&buf[..]),
            Err(SuggestError::InvalidSize {
                what: "range containers",
                len: 13
            })
        ));

        let buf = b"0 12 0\n".to_vec();
        assert!(matches!(
            NGramVector::read(&buf[..]),
            Err(SuggestError::InvalidSize { what: "values", .. })
        ));
    }

    #[test]
    fn test_read_truncated() {
        let v = bigrams();
        let mut buf = vec![];
        v.write(&mut buf).unwrap();
        buf.truncate(buf.len() - 1);
        assert!(matches!(
            NGramVector::read(&buf[..]),
            Err(SuggestError::InvalidSize {
                what: "values",
                len: 79
            })
        ));
    }

    #[test]
    fn test_read_oversized_header() {
        assert!(matches!(
            NGramVector::read(&b"0 800000000000000000 0\n"[..]),
            Err(SuggestError::InvalidSize {
                what: "values",
                len: 0
            })
        ));
        assert!(matches!(
            NGramVector::read(&b"120000000000000000 0 0\n\x01\x02"[..]),
            Err(SuggestError::InvalidSize {
                what: "range containers",
                len: 2
            })
        ));
    }
}
