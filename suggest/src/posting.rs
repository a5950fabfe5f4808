//! Iterators over posting lists.
//!
//! Iterators are single-pass: [`PostingList::lower_bound`] never rewinds.
//! Dereferencing an exhausted list yields [`PostingListMissing`], which the
//! mergers treat as the end of the list.
use std::error::Error;
use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::codec::{read_vuint32, LAST_BLOCK_FLAG};
use crate::common::SKIP_GAP;
use crate::errors::{Result, SuggestError};

/// Signals that an iterator has no current element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingListMissing;

impl fmt::Display for PostingListMissing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PostingListMissing")
    }
}

impl Error for PostingListMissing {}

/// Result of iterator operations.
pub type PostingResult = std::result::Result<u32, PostingListMissing>;

/// Iterator over an ascending list of document ids.
pub trait PostingList {
    /// Gets the current element.
    fn get(&self) -> PostingResult;

    /// Checks if at least one element remains ahead of the current one.
    fn has_next(&self) -> bool;

    /// Advances by one and returns the new current element.
    fn next(&mut self) -> PostingResult;

    /// Advances to the smallest element that is not less than `x`.
    fn lower_bound(&mut self, x: u32) -> PostingResult;

    /// Gets the total number of elements.
    fn len(&self) -> usize;

    /// Checks if the list has no element.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains the remaining elements, the current one included.
    fn collect_all(mut self) -> Vec<u32>
    where
        Self: Sized,
    {
        let mut result = Vec::with_capacity(self.len());
        let mut cur = self.get();
        while let Ok(v) = cur {
            result.push(v);
            cur = self.next();
        }
        result
    }
}

/// Iterator over decoded ids held in memory.
#[derive(Debug, Clone, Default)]
pub struct SliceIterator {
    list: Vec<u32>,
    index: usize,
}

impl SliceIterator {
    /// Creates an iterator positioned on the first element.
    pub fn new(list: Vec<u32>) -> Self {
        Self { list, index: 0 }
    }
}

impl PostingList for SliceIterator {
    #[inline(always)]
    fn get(&self) -> PostingResult {
        self.list.get(self.index).copied().ok_or(PostingListMissing)
    }

    #[inline(always)]
    fn has_next(&self) -> bool {
        self.index + 1 < self.list.len()
    }

    #[inline(always)]
    fn next(&mut self) -> PostingResult {
        if self.index < self.list.len() {
            self.index += 1;
        }
        self.get()
    }

    fn lower_bound(&mut self, x: u32) -> PostingResult {
        let rest = self.list.get(self.index..).unwrap_or_default();
        self.index += rest.partition_point(|&v| v < x);
        self.get()
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.list.len()
    }
}

/// Iterator decoding the skip-pointer block codec in place.
#[derive(Debug, Clone)]
pub struct SkipIterator<'a> {
    bytes: &'a [u8],
    len: usize,
    // Global index of the current element; `len` when exhausted.
    index: usize,
    current: u32,
    // Head value and byte range of the payload of the current block.
    block_head: u32,
    cursor: usize,
    block_end: usize,
    last_block: bool,
}

impl<'a> SkipIterator<'a> {
    /// Creates an iterator over `len` ids encoded by
    /// [`SkipEncoder`](crate::codec::SkipEncoder).
    ///
    /// # Errors
    ///
    /// [`SuggestError::InvalidCodec`] is returned when the chain of blocks
    /// does not hold exactly `len` ids.
    pub fn new(bytes: &'a [u8], len: usize) -> Result<Self> {
        validate_blocks(bytes, len)?;
        let mut it = Self {
            bytes,
            len,
            index: len,
            current: 0,
            block_head: 0,
            cursor: 0,
            block_end: 0,
            last_block: true,
        };
        if len != 0 {
            it.enter_block(0, 0).ok_or_else(|| {
                SuggestError::invalid_codec("malformed head of the first skip block")
            })?;
            it.index = 0;
        }
        Ok(it)
    }

    // Reads the header and head of the block at `offset`.
    fn enter_block(&mut self, offset: usize, prev_head: u32) -> Option<()> {
        let header = LittleEndian::read_u16(self.bytes.get(offset..offset + 2)?);
        let payload_len = usize::from(header & !LAST_BLOCK_FLAG);
        let payload_end = offset + 2 + payload_len;
        if payload_end > self.bytes.len() {
            return None;
        }
        let (delta, n) = read_vuint32(&self.bytes[offset + 2..payload_end])?;
        self.block_head = prev_head.checked_add(delta)?;
        self.current = self.block_head;
        self.cursor = offset + 2 + n;
        self.block_end = payload_end;
        self.last_block = header & LAST_BLOCK_FLAG != 0;
        Some(())
    }

    // Head of the next block without moving.
    fn peek_next_head(&self) -> Option<u32> {
        if self.last_block {
            return None;
        }
        let offset = self.block_end;
        let header = LittleEndian::read_u16(self.bytes.get(offset..offset + 2)?);
        let payload_end = offset + 2 + usize::from(header & !LAST_BLOCK_FLAG);
        let (delta, _) = read_vuint32(self.bytes.get(offset + 2..payload_end)?)?;
        self.block_head.checked_add(delta)
    }

    #[inline(always)]
    fn exhaust(&mut self) -> PostingResult {
        self.index = self.len;
        Err(PostingListMissing)
    }

    // Moves to the head of the next block; `index` must be block aligned.
    fn jump_to_next_block(&mut self) -> PostingResult {
        let (offset, prev_head) = (self.block_end, self.block_head);
        if self.last_block || self.enter_block(offset, prev_head).is_none() {
            return self.exhaust();
        }
        Ok(self.current)
    }
}

// Walks the block headers, checking that every block but the last holds
// SKIP_GAP varints and that the flag marks the block ending the list.
fn validate_blocks(bytes: &[u8], len: usize) -> Result<()> {
    let mut offset = 0;
    let mut remaining = len;
    while remaining != 0 {
        let header = bytes
            .get(offset..offset + 2)
            .map(LittleEndian::read_u16)
            .ok_or_else(|| {
                SuggestError::invalid_codec(format!("truncated skip header at byte {offset}"))
            })?;
        let payload_end = offset + 2 + usize::from(header & !LAST_BLOCK_FLAG);
        let payload = bytes.get(offset + 2..payload_end).ok_or_else(|| {
            SuggestError::invalid_codec(format!("truncated skip block at byte {offset}"))
        })?;
        let expected = remaining.min(SKIP_GAP);
        let num_varints = payload.iter().filter(|&&b| b & 0x80 == 0).count();
        if num_varints != expected || payload.last().map_or(true, |&b| b & 0x80 != 0) {
            return Err(SuggestError::invalid_codec(format!(
                "skip block at byte {offset} holds {num_varints} ids instead of {expected}"
            )));
        }
        remaining -= expected;
        if (header & LAST_BLOCK_FLAG != 0) != (remaining == 0) {
            return Err(SuggestError::invalid_codec(format!(
                "misplaced last-block flag at byte {offset}"
            )));
        }
        offset = payload_end;
    }
    if offset != bytes.len() {
        return Err(SuggestError::invalid_codec(format!(
            "{} trailing bytes after the last skip block",
            bytes.len() - offset
        )));
    }
    Ok(())
}

impl PostingList for SkipIterator<'_> {
    #[inline(always)]
    fn get(&self) -> PostingResult {
        if self.index < self.len {
            Ok(self.current)
        } else {
            Err(PostingListMissing)
        }
    }

    #[inline(always)]
    fn has_next(&self) -> bool {
        self.index + 1 < self.len
    }

    fn next(&mut self) -> PostingResult {
        if self.index >= self.len {
            return Err(PostingListMissing);
        }
        self.index += 1;
        if self.index == self.len {
            return Err(PostingListMissing);
        }
        if self.index % SKIP_GAP == 0 {
            return self.jump_to_next_block();
        }
        let Some((delta, n)) = self
            .bytes
            .get(self.cursor..self.block_end)
            .and_then(read_vuint32)
        else {
            return self.exhaust();
        };
        self.cursor += n;
        match self.current.checked_add(delta) {
            Some(v) => {
                self.current = v;
                Ok(v)
            }
            None => self.exhaust(),
        }
    }

    fn lower_bound(&mut self, x: u32) -> PostingResult {
        let cur = self.get()?;
        if cur >= x {
            return Ok(cur);
        }
        while let Some(head) = self.peek_next_head() {
            if head > x {
                break;
            }
            self.index = (self.index / SKIP_GAP + 1) * SKIP_GAP;
            self.jump_to_next_block()?;
        }
        let mut cur = self.get()?;
        while cur < x {
            cur = self.next()?;
        }
        Ok(cur)
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.len
    }
}

/// A posting list fetched from an index.
#[derive(Debug, Clone)]
pub enum PostingListIter<'a> {
    /// Short lists decoded into memory.
    Slice(SliceIterator),

    /// Long lists decoded lazily.
    Skip(SkipIterator<'a>),
}

macro_rules! dispatch {
    ( $self:ident, $it:ident => $e:expr ) => {
        match $self {
            Self::Slice($it) => $e,
            Self::Skip($it) => $e,
        }
    };
}

impl PostingList for PostingListIter<'_> {
    #[inline(always)]
    fn get(&self) -> PostingResult {
        dispatch!(self, it => it.get())
    }

    #[inline(always)]
    fn has_next(&self) -> bool {
        dispatch!(self, it => it.has_next())
    }

    #[inline(always)]
    fn next(&mut self) -> PostingResult {
        dispatch!(self, it => it.next())
    }

    #[inline(always)]
    fn lower_bound(&mut self, x: u32) -> PostingResult {
        dispatch!(self, it => it.lower_bound(x))
    }

    #[inline(always)]
    fn len(&self) -> usize {
        dispatch!(self, it => it.len())
    }
}
