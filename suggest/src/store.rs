//! Flat namespaces of named files.
//!
//! A [`Directory`] creates [`Output`]s for writing and opens [`Input`]s for
//! reading. Inputs are windows over shared immutable bytes, either memory
//! mapped from a file or held in RAM, so slicing never copies.
mod input;
mod output;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hashbrown::HashMap;
use memmap2::Mmap;
use parking_lot::RwLock;

use crate::errors::{Result, SuggestError};

pub use input::Input;
pub use output::{Output, OutputExt};

use input::Backing;

/// A flat namespace of named files.
pub trait Directory: Send + Sync {
    /// Creates a new file, replacing an existing one.
    fn create_output(&self, name: &str) -> Result<Box<dyn Output>>;

    /// Opens an existing file.
    fn open_input(&self, name: &str) -> Result<Input>;
}

/// A directory on the filesystem whose inputs are memory mapped.
#[derive(Debug, Clone)]
pub struct FsDirectory {
    root: PathBuf,
}

impl FsDirectory {
    /// Opens the directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// [`SuggestError`] is returned when the directory cannot be created.
    pub fn new<P>(root: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        fs::create_dir_all(root.as_ref())?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
        })
    }
}

impl Directory for FsDirectory {
    fn create_output(&self, name: &str) -> Result<Box<dyn Output>> {
        Ok(Box::new(output::FileOutput::create(self.root.join(name))?))
    }

    fn open_input(&self, name: &str) -> Result<Input> {
        let file = File::open(self.root.join(name))?;
        // An empty file cannot be mapped on every platform.
        if file.metadata()?.len() == 0 {
            return Ok(Input::new(Arc::new(Backing::Ram(Arc::from(Vec::new())))));
        }
        // SAFETY: the files of a directory are written once and never
        // modified while they are open for reading.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Input::new(Arc::new(Backing::Mmap(mmap))))
    }
}

type FileTable = Arc<RwLock<HashMap<String, Arc<[u8]>>>>;

/// A directory held in memory.
#[derive(Debug, Clone, Default)]
pub struct RamDirectory {
    files: FileTable,
}

impl RamDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the names of the closed files.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.files.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl Directory for RamDirectory {
    fn create_output(&self, name: &str) -> Result<Box<dyn Output>> {
        Ok(Box::new(output::RamOutput::new(
            name.to_string(),
            self.files.clone(),
        )))
    }

    fn open_input(&self, name: &str) -> Result<Input> {
        let files = self.files.read();
        let bytes = files.get(name).ok_or_else(|| {
            SuggestError::StdIo(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{name} is not found in the RAM directory"),
            ))
        })?;
        Ok(Input::new(Arc::new(Backing::Ram(bytes.clone()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Read, Seek, SeekFrom, Write};

    fn write_sample(dir: &dyn Directory) {
        let mut out = dir.create_output("sample").unwrap();
        out.write_byte(7).unwrap();
        out.write_vuint32(300).unwrap();
        out.write_u32(0xdeadbeef).unwrap();
        out.write_u16(0xbeef).unwrap();
        out.write_all(b"tail").unwrap();
        out.close().unwrap();
    }

    fn check_sample(dir: &dyn Directory) {
        let mut input = dir.open_input("sample").unwrap();
        assert_eq!(input.len(), 1 + 2 + 4 + 2 + 4);
        assert_eq!(input.read_byte().unwrap(), 7);
        assert_eq!(input.read_vuint32().unwrap(), 300);
        assert_eq!(input.read_u32().unwrap(), 0xdeadbeef);
        assert_eq!(input.read_u16().unwrap(), 0xbeef);
        let mut tail = String::new();
        input.read_to_string(&mut tail).unwrap();
        assert_eq!(tail, "tail");

        input.seek(SeekFrom::Start(1)).unwrap();
        assert_eq!(input.read_vuint32().unwrap(), 300);

        let mut buf = [0; 4];
        assert_eq!(input.read_at(&mut buf, 9).unwrap(), 4);
        assert_eq!(&buf, b"tail");

        let mut slice = input.slice(9, 4).unwrap();
        assert_eq!(slice.as_bytes(), b"tail");
        assert_eq!(slice.read_byte().unwrap(), b't');
        assert!(input.slice(10, 4).is_err());
    }

    #[test]
    fn test_ram_directory() {
        let dir = RamDirectory::new();
        write_sample(&dir);
        check_sample(&dir);
        assert_eq!(dir.file_names(), vec!["sample".to_string()]);
    }

    #[test]
    fn test_ram_directory_missing() {
        let dir = RamDirectory::new();
        assert!(matches!(
            dir.open_input("nothing"),
            Err(SuggestError::StdIo(_))
        ));
    }

    #[test]
    fn test_fs_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = FsDirectory::new(tmp.path()).unwrap();
        write_sample(&dir);
        check_sample(&dir);
    }

    #[test]
    fn test_fs_directory_replace_keeps_open_inputs() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = FsDirectory::new(tmp.path()).unwrap();
        write_sample(&dir);
        let old = dir.open_input("sample").unwrap();

        let mut out = dir.create_output("sample").unwrap();
        out.write_all(b"new").unwrap();
        out.close().unwrap();

        assert_eq!(old.len(), 13);
        assert_eq!(dir.open_input("sample").unwrap().as_bytes(), b"new");
        assert!(!tmp.path().join("sample.tmp").exists());
    }

    #[test]
    fn test_fs_directory_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = FsDirectory::new(tmp.path()).unwrap();
        dir.create_output("empty").unwrap().close().unwrap();
        let input = dir.open_input("empty").unwrap();
        assert!(input.is_empty());
    }
}
