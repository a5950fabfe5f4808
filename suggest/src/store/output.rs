use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use byteorder::{LittleEndian, WriteBytesExt};

use super::FileTable;
use crate::codec;
use crate::errors::Result;

/// A writable file of a [`Directory`](super::Directory).
pub trait Output: Write + Send {
    /// Flushes buffered writes and closes the file.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Fixed and variable width writers for any byte sink.
pub trait OutputExt: Write {
    /// Writes a variable-byte `u32` and returns the number of bytes written.
    fn write_vuint32(&mut self, value: u32) -> io::Result<usize> {
        codec::write_vuint32(self, value)
    }

    /// Writes a little-endian `u32`.
    fn write_u32(&mut self, value: u32) -> io::Result<()> {
        WriteBytesExt::write_u32::<LittleEndian>(self, value)
    }

    /// Writes a little-endian `u16`.
    fn write_u16(&mut self, value: u16) -> io::Result<()> {
        WriteBytesExt::write_u16::<LittleEndian>(self, value)
    }

    /// Writes one byte.
    fn write_byte(&mut self, value: u8) -> io::Result<()> {
        WriteBytesExt::write_u8(self, value)
    }
}

impl<W> OutputExt for W where W: Write + ?Sized {}

/// Writes next to the target and renames over it on close, so that maps of
/// the previous file stay valid.
pub(crate) struct FileOutput {
    wtr: BufWriter<File>,
    tmp: PathBuf,
    path: PathBuf,
}

impl FileOutput {
    pub(crate) fn create(path: PathBuf) -> Result<Self> {
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let wtr = BufWriter::new(File::create(&tmp)?);
        Ok(Self { wtr, tmp, path })
    }
}

impl Write for FileOutput {
    #[inline(always)]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.wtr.write(buf)
    }

    #[inline(always)]
    fn flush(&mut self) -> io::Result<()> {
        self.wtr.flush()
    }
}

impl Output for FileOutput {
    fn close(self: Box<Self>) -> Result<()> {
        let Self { wtr, tmp, path } = *self;
        let file = wtr.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}

/// Collects bytes and publishes them to the directory on close.
pub(crate) struct RamOutput {
    name: String,
    buf: Vec<u8>,
    files: FileTable,
}

impl RamOutput {
    pub(crate) fn new(name: String, files: FileTable) -> Self {
        Self {
            name,
            buf: vec![],
            files,
        }
    }
}

impl Write for RamOutput {
    #[inline(always)]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    #[inline(always)]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Output for RamOutput {
    fn close(self: Box<Self>) -> Result<()> {
        let Self { name, buf, files } = *self;
        files.write().insert(name, Arc::from(buf));
        Ok(())
    }
}
