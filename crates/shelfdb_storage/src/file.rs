//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A file-based storage backend.
///
/// One backend wraps one file, opened for reading and appending. The size
/// is tracked alongside the handle so appends and bounds checks never
/// re-stat the file.
///
/// # Durability
///
/// - `flush()` pushes buffered data to the OS
/// - `sync()` calls `File::sync_all()` so the data is on disk
///
/// # Example
///
/// ```no_run
/// use shelfdb_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("wal.bson")).unwrap();
/// backend.append(b"record bytes").unwrap();
/// backend.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    file: File,
    size: u64,
}

impl FileBackend {
    /// Opens or creates a file backend at the given path.
    ///
    /// Existing contents are kept; appends continue from the current end.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        Self::open_options(path, false)
    }

    /// Creates a file backend at the given path, discarding any existing
    /// contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: &Path) -> StorageResult<Self> {
        Self::open_options(path, true)
    }

    /// Opens or creates a file backend, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the file cannot
    /// be opened.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    fn open_options(path: &Path, truncate: bool) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(truncate)
            .open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(Inner { file, size }),
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let mut inner = self.inner.lock();

        let end = offset.saturating_add(len as u64);
        if end > inner.size {
            return Err(StorageError::ReadPastEnd {
                offset,
                len,
                size: inner.size,
            });
        }
        if len == 0 {
            return Ok(Vec::new());
        }

        inner.file.seek(SeekFrom::Start(offset))?;
        let mut buffer = vec![0u8; len];
        inner.file.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let mut inner = self.inner.lock();
        let offset = inner.size;
        if data.is_empty() {
            return Ok(offset);
        }

        inner.file.seek(SeekFrom::End(0))?;
        inner.file.write_all(data)?;
        inner.size += data.len() as u64;
        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.inner.lock().file.flush()?;
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.inner.lock().file.sync_all()?;
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.inner.lock().size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn data_survives_reopen() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("data.bin");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            backend.append(b"persisted").unwrap();
            backend.sync().unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 9);
        assert_eq!(backend.read_all().unwrap(), b"persisted");
    }

    #[test]
    fn create_discards_existing_contents() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("data.bin");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            backend.append(b"stale").unwrap();
        }

        let mut backend = FileBackend::create(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        backend.append(b"fresh").unwrap();
        assert_eq!(backend.read_all().unwrap(), b"fresh");
    }

    #[test]
    fn open_with_create_dirs_creates_parents() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("dirs").join("data.bin");

        let mut backend = FileBackend::open_with_create_dirs(&path).unwrap();
        backend.append(b"x").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn append_returns_previous_size() {
        let temp = tempdir().unwrap();
        let mut backend = FileBackend::open(&temp.path().join("d.bin")).unwrap();

        assert_eq!(backend.append(b"aaa").unwrap(), 0);
        assert_eq!(backend.append(b"bb").unwrap(), 3);
        assert_eq!(backend.append(b"c").unwrap(), 5);
    }
}
