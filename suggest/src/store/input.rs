use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::ops::Deref;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;

use crate::codec;
use crate::errors::{Result, SuggestError};

/// Bytes shared by every input opened on the same file.
pub(crate) enum Backing {
    Mmap(Mmap),
    Ram(Arc<[u8]>),
}

impl Deref for Backing {
    type Target = [u8];

    #[inline(always)]
    fn deref(&self) -> &[u8] {
        match self {
            Self::Mmap(mmap) => mmap,
            Self::Ram(bytes) => bytes,
        }
    }
}

/// A readable window over the bytes of a file.
///
/// Cloning and slicing are cheap; the underlying bytes are released when the
/// last window is dropped.
#[derive(Clone)]
pub struct Input {
    backing: Arc<Backing>,
    start: usize,
    len: usize,
    pos: usize,
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Input")
            .field("start", &self.start)
            .field("len", &self.len)
            .field("pos", &self.pos)
            .finish()
    }
}

impl Input {
    pub(crate) fn new(backing: Arc<Backing>) -> Self {
        let len = backing.len();
        Self {
            backing,
            start: 0,
            len,
            pos: 0,
        }
    }

    /// Gets the whole window as a byte slice.
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.backing[self.start..self.start + self.len]
    }

    /// Gets the window length in bytes.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the window is empty.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Gets the current read position relative to the window.
    #[inline(always)]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[inline(always)]
    fn remaining(&self) -> &[u8] {
        &self.as_bytes()[self.pos..]
    }

    fn unexpected_eof() -> SuggestError {
        SuggestError::StdIo(io::Error::from(io::ErrorKind::UnexpectedEof))
    }

    /// Reads bytes at `offset` without moving the read position.
    ///
    /// Returns the number of bytes copied, which is short only at the end of
    /// the window.
    pub fn read_at(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
        if offset > self.len {
            return Err(Self::unexpected_eof());
        }
        let src = &self.as_bytes()[offset..];
        let n = src.len().min(buf.len());
        buf[..n].copy_from_slice(&src[..n]);
        Ok(n)
    }

    /// Reads one byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        let b = *self.remaining().first().ok_or_else(Self::unexpected_eof)?;
        self.pos += 1;
        Ok(b)
    }

    /// Reads a variable-byte `u32`.
    pub fn read_vuint32(&mut self) -> Result<u32> {
        let (value, len) = codec::read_vuint32(self.remaining())
            .ok_or_else(|| SuggestError::invalid_codec("truncated or malformed varint"))?;
        self.pos += len;
        Ok(value)
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.remaining().get(..4).ok_or_else(Self::unexpected_eof)?;
        let value = LittleEndian::read_u32(bytes);
        self.pos += 4;
        Ok(value)
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.remaining().get(..2).ok_or_else(Self::unexpected_eof)?;
        let value = LittleEndian::read_u16(bytes);
        self.pos += 2;
        Ok(value)
    }

    /// Creates a sub-window of `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// [`SuggestError`] is returned when the range exceeds the window.
    pub fn slice(&self, offset: usize, len: usize) -> Result<Self> {
        let end = offset.checked_add(len).ok_or_else(Self::unexpected_eof)?;
        if end > self.len {
            return Err(Self::unexpected_eof());
        }
        Ok(Self {
            backing: self.backing.clone(),
            start: self.start + offset,
            len,
            pos: 0,
        })
    }
}

impl Read for Input {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let src = self.remaining();
        let n = src.len().min(buf.len());
        buf[..n].copy_from_slice(&src[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl Seek for Input {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::End(offset) => self.len as i128 + i128::from(offset),
            SeekFrom::Current(offset) => self.pos as i128 + i128::from(offset),
        };
        if target < 0 || target > self.len as i128 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek out of the window",
            ));
        }
        self.pos = target as usize;
        Ok(self.pos as u64)
    }
}
