//! Database directory management.
//!
//! This module handles the file system layout for ShelfDB:
//!
//! ```text
//! <root>/
//! ├─ LOCK                          # Advisory lock for single-writer
//! └─ <collection>/
//!    ├─ wal.bson                   # Pending operation log (absent when flushed)
//!    ├─ data_000001.bson           # Append-only segment files
//!    └─ index_<field>.btree        # Persisted field indexes
//! ```
//!
//! The LOCK file ensures only one process writes to the database at a time.
//! Collection directories are materialized lazily on first access.

use crate::error::{CoreError, CoreResult};
use crate::types::SegmentId;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const WAL_FILE: &str = "wal.bson";
const INDEX_PREFIX: &str = "index_";
const INDEX_SUFFIX: &str = ".btree";

/// Manages the database root directory and file locking.
///
/// Holds an exclusive advisory lock on the root for as long as it lives;
/// only one `DatabaseDir` instance can exist per root at a time.
#[derive(Debug)]
pub struct DatabaseDir {
    /// Root directory path.
    path: PathBuf,
    /// Lock file handle (held for exclusive access).
    _lock_file: File,
}

impl DatabaseDir {
    /// Opens or creates a database root directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist and `create_if_missing` is false
    /// - Another process holds the lock (returns `DatabaseLocked`)
    /// - I/O errors occur
    pub fn open(path: &Path, create_if_missing: bool) -> CoreResult<Self> {
        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(CoreError::invalid_format(format!(
                    "database directory does not exist: {}",
                    path.display()
                )));
            }
        }

        if !path.is_dir() {
            return Err(CoreError::invalid_format(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let lock_path = path.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(CoreError::DatabaseLocked);
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the database root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Materializes a collection directory, creating it on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid collection name or the
    /// directory cannot be created.
    pub fn ensure_collection(&self, name: &str) -> CoreResult<CollectionDir> {
        if !is_valid_name(name) {
            return Err(CoreError::invalid_format(format!(
                "invalid collection name: {name:?}"
            )));
        }

        let path = self.path.join(name);
        fs::create_dir_all(&path)?;
        Ok(CollectionDir { path })
    }
}

/// Valid collection names: non-empty ASCII alphanumerics, `_`, `-`.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Returns whether a field name can be used in an index file name.
#[must_use]
pub fn is_indexable_field_name(name: &str) -> bool {
    is_valid_name(name)
}

/// Paths and file listings for one collection's directory.
#[derive(Debug, Clone)]
pub struct CollectionDir {
    path: PathBuf,
}

impl CollectionDir {
    /// Returns the collection directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path to the collection's WAL file.
    #[must_use]
    pub fn wal_path(&self) -> PathBuf {
        self.path.join(WAL_FILE)
    }

    /// Returns the path to a segment file.
    #[must_use]
    pub fn segment_path(&self, id: SegmentId) -> PathBuf {
        self.path.join(id.file_name())
    }

    /// Returns the path to a field's index file.
    #[must_use]
    pub fn index_path(&self, field: &str) -> PathBuf {
        self.path.join(format!("{INDEX_PREFIX}{field}{INDEX_SUFFIX}"))
    }

    /// Lists segment ids in ascending order (oldest first).
    pub fn list_segments(&self) -> CoreResult<Vec<SegmentId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if let Some(id) = SegmentId::from_file_name(name) {
                    ids.push(id);
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Lists index file paths for the collection.
    pub fn list_index_files(&self) -> CoreResult<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(INDEX_PREFIX) && name.ends_with(INDEX_SUFFIX) {
                    paths.push(entry.path());
                }
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Removes a file and fsyncs the directory so the deletion is durable.
    pub fn remove_file(&self, path: &Path) -> CoreResult<()> {
        fs::remove_file(path)?;
        self.sync_directory()
    }

    /// Syncs the collection directory to make metadata updates durable.
    ///
    /// After creating, renaming, or deleting files, the directory must be
    /// fsynced for the change to survive a crash.
    #[cfg(unix)]
    pub fn sync_directory(&self) -> CoreResult<()> {
        let dir = File::open(&self.path)?;
        dir.sync_all()?;
        Ok(())
    }

    /// Syncs the collection directory to make metadata updates durable.
    ///
    /// Windows NTFS journaling provides equivalent metadata durability, so
    /// the explicit fsync is skipped there.
    #[cfg(not(unix))]
    pub fn sync_directory(&self) -> CoreResult<()> {
        Ok(())
    }
}
