//! Database handle.

use crate::collection::Collection;
use crate::config::Config;
use crate::dir::DatabaseDir;
use crate::error::CoreResult;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// An open ShelfDB database.
///
/// Owns the root directory's exclusive lock for its lifetime and hands out
/// shared [`Collection`] handles. Collections materialize lazily on first
/// access and are cached per name.
#[derive(Debug)]
pub struct Database {
    config: Config,
    dir: DatabaseDir,
    collections: RwLock<HashMap<String, Arc<Collection>>>,
}

impl Database {
    /// Opens a database at the given path with default configuration.
    ///
    /// # Errors
    ///
    /// Fails when another process holds the database, or the root can't be
    /// created or read.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a database with explicit configuration.
    pub fn open_with_config(path: impl AsRef<Path>, config: Config) -> CoreResult<Self> {
        let path = path.as_ref();
        let dir = DatabaseDir::open(path, config.create_if_missing)?;
        info!(path = %path.display(), "database opened");
        Ok(Self {
            config,
            dir,
            collections: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the database root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Returns a handle to a collection, creating its directory on first
    /// access.
    pub fn collection(&self, name: &str) -> CoreResult<Arc<Collection>> {
        if let Some(collection) = self.collections.read().get(name) {
            return Ok(Arc::clone(collection));
        }

        let mut collections = self.collections.write();
        // Racing callers may have created it while we waited for the lock
        if let Some(collection) = collections.get(name) {
            return Ok(Arc::clone(collection));
        }

        let dir = self.dir.ensure_collection(name)?;
        let collection = Arc::new(Collection::new(
            name.to_string(),
            dir,
            self.config.sync_on_write,
            self.config.segment_capacity,
        ));
        collections.insert(name.to_string(), Arc::clone(&collection));
        Ok(collection)
    }
}
