//! Minimal perfect hash over a static set of strings.
//!
//! Construction follows Steve Hanov's two-level scheme with FNV-1a hashing:
//! keys are bucketed by their unsalted hash, buckets with collisions get the
//! smallest salt spreading them over free slots, and singleton buckets are
//! assigned a free slot directly, stored as `-(slot + 1)`.
use std::cmp::Reverse;
use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use hashbrown::HashSet;

use crate::codec::{BinaryDecoder, BinaryEncoder, Decoder, Encoder};
use crate::dictionary::Dictionary;
use crate::errors::{Result, SuggestError};
use crate::utils;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;
const MAX_SALT: u32 = 1 << 24;

#[inline(always)]
fn hash(salt: u32, key: &[u8]) -> u32 {
    let mut h = if salt == 0 { FNV_OFFSET_BASIS } else { salt };
    for &b in key {
        h ^= u32::from(b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// Minimal perfect hash mapping each key of the build set to its value.
///
/// Keys outside of the build set map to an arbitrary value, so lookups must
/// be verified against the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mph {
    values: Vec<u32>,
    aux: Vec<i32>,
}

impl Mph {
    /// Builds the hash from `(key, value)` records.
    ///
    /// # Errors
    ///
    /// [`SuggestError`] is returned when a key is duplicated or the table
    /// would be too large.
    pub fn build<'a, I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let records: Vec<(&str, u32)> = records.into_iter().collect();
        let n = records.len();
        if n == 0 {
            return Ok(Self::default());
        }
        if i32::try_from(n).is_err() {
            return Err(SuggestError::invalid_config("mph", "too many keys"));
        }
        let mut seen = HashSet::with_capacity(n);
        for &(key, _) in &records {
            if !seen.insert(key) {
                return Err(SuggestError::invalid_config(
                    "mph",
                    format!("duplicate key: {key}"),
                ));
            }
        }

        let slot_of = |salt: u32, key: &str| hash(salt, key.as_bytes()) as usize % n;
        let mut buckets: Vec<Vec<usize>> = vec![vec![]; n];
        for (i, &(key, _)) in records.iter().enumerate() {
            buckets[slot_of(0, key)].push(i);
        }
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&b| Reverse(buckets[b].len()));

        let mut values = vec![0; n];
        let mut taken = vec![false; n];
        let mut aux = vec![0; n];
        let mut slots = Vec::new();
        for &b in &order {
            let bucket = &buckets[b];
            if bucket.len() <= 1 {
                break;
            }
            let mut salt = 1;
            loop {
                slots.clear();
                for &i in bucket {
                    let slot = slot_of(salt, records[i].0);
                    if taken[slot] || slots.contains(&slot) {
                        break;
                    }
                    slots.push(slot);
                }
                if slots.len() == bucket.len() {
                    break;
                }
                salt += 1;
                if salt > MAX_SALT {
                    return Err(SuggestError::invalid_config(
                        "mph",
                        "no salt separates a bucket",
                    ));
                }
            }
            aux[b] = salt as i32;
            for (&i, &slot) in bucket.iter().zip(&slots) {
                taken[slot] = true;
                values[slot] = records[i].1;
            }
        }

        let mut free = (0..n).filter(|&slot| !taken[slot]);
        for &b in &order {
            let bucket = &buckets[b];
            if bucket.len() != 1 {
                continue;
            }
            // As many free slots remain as singleton buckets.
            let Some(slot) = free.next() else {
                return Err(SuggestError::invalid_config("mph", "no free slot left"));
            };
            aux[b] = -(slot as i32) - 1;
            values[slot] = records[bucket[0]].1;
        }

        Ok(Self { values, aux })
    }

    /// Builds the hash mapping every value of the dictionary to its id.
    pub fn from_dictionary(dictionary: &dyn Dictionary) -> Result<Self> {
        let mut words = Vec::with_capacity(dictionary.size());
        dictionary.iterate(&mut |id, value| {
            words.push((value.to_string(), id));
            Ok(())
        })?;
        Self::build(words.iter().map(|(w, id)| (w.as_str(), *id)))
    }

    /// Gets the value of the key, or [`None`] if the table is empty.
    #[inline(always)]
    pub fn get(&self, key: &str) -> Option<u32> {
        let n = self.values.len();
        if n == 0 {
            return None;
        }
        let d = self.aux[hash(0, key.as_bytes()) as usize % n];
        let slot = if d < 0 {
            (-(d + 1)) as usize
        } else {
            hash(d as u32, key.as_bytes()) as usize % n
        };
        self.values.get(slot).copied()
    }

    /// Gets the number of keys.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks if the table has no key.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Writes `|values|`, the values, `|aux|` and the aux entries, all
    /// little-endian 32-bit.
    pub fn write<W>(&self, mut wtr: W) -> Result<usize>
    where
        W: Write,
    {
        let aux: Vec<u32> = self.aux.iter().map(|&d| d as u32).collect();
        let mut written = 0;
        for table in [&self.values, &aux] {
            wtr.write_u32::<LittleEndian>(u32::try_from(table.len())?)?;
            written += 4 + BinaryEncoder.encode(table, &mut wtr)?;
        }
        Ok(written)
    }

    /// Reads a table written by [`Mph::write`].
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut read_table = || -> Result<Vec<u32>> {
            let len = usize::try_from(rdr.read_u32::<LittleEndian>()?)?;
            let num_bytes = len.checked_mul(4).ok_or(SuggestError::InvalidSize {
                what: "mph table",
                len,
            })?;
            let bytes = utils::read_bytes(&mut rdr, num_bytes, "mph table")?;
            let mut table = vec![0; len];
            BinaryDecoder.decode(&bytes, &mut table)?;
            Ok(table)
        };
        let values = read_table()?;
        let aux: Vec<i32> = read_table()?.into_iter().map(|d| d as i32).collect();
        if values.len() != aux.len() {
            return Err(SuggestError::InvalidSize {
                what: "mph aux",
                len: aux.len() * 4,
            });
        }
        Ok(Self { values, aux })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::InMemoryDictionary;

    #[test]
    fn test_every_key_maps_to_its_value() {
        let words: Vec<String> = (0..2000).map(|i| format!("word{i}")).collect();
        let dict = InMemoryDictionary::new(words.clone());
        let mph = Mph::from_dictionary(&dict).unwrap();
        assert_eq!(mph.len(), 2000);
        for (id, word) in words.iter().enumerate() {
            let found = mph.get(word).unwrap();
            assert_eq!(found, id as u32);
            assert_eq!(dict.get(found).unwrap().as_deref(), Some(word.as_str()));
        }
    }

    #[test]
    fn test_values_are_a_permutation() {
        let mph = Mph::build([("a", 0), ("b", 1), ("c", 2), ("d", 3), ("e", 4)]).unwrap();
        let mut values = mph.values.clone();
        values.sort_unstable();
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_duplicate() {
        assert!(Mph::build([("a", 0), ("a", 1)]).is_err());
    }

    #[test]
    fn test_empty() {
        let mph = Mph::build(std::iter::empty()).unwrap();
        assert!(mph.is_empty());
        assert_eq!(mph.get("a"), None);
    }

    #[test]
    fn test_write_read() {
        let mph = Mph::build([("i", 0), ("am", 1), ("sam", 2)]).unwrap();
        let mut buf = vec![];
        let written = mph.write(&mut buf).unwrap();
        assert_eq!(written, buf.len());
        assert_eq!(buf.len(), 4 + 12 + 4 + 12);
        let other = Mph::read(&buf[..]).unwrap();
        assert_eq!(other, mph);
        assert_eq!(other.get("sam"), Some(2));
    }

    #[test]
    fn test_read_oversized_length() {
        let mut buf = u32::MAX.to_le_bytes().to_vec();
        buf.extend([0; 8]);
        assert!(matches!(
            Mph::read(&buf[..]),
            Err(SuggestError::InvalidSize {
                what: "mph table",
                len: 8
            })
        ));
    }
}
