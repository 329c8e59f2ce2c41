//! Index file maintenance per collection.

use crate::dir::{is_indexable_field_name, CollectionDir};
use crate::error::{CoreError, CoreResult};
use crate::index::field::FieldIndex;
use crate::types::{is_metadata_field, DocumentId, FIELD_ID};
use shelfdb_codec::{Document, Value};
use shelfdb_storage::{FileBackend, StorageBackend};
use std::fs;
use tracing::debug;

/// Loads, updates, and persists a collection's field index files.
#[derive(Debug)]
pub struct IndexManager {
    dir: CollectionDir,
}

impl IndexManager {
    /// Creates a manager over a collection directory.
    #[must_use]
    pub fn new(dir: CollectionDir) -> Self {
        Self { dir }
    }

    /// Refreshes the index of every indexable field of a document.
    ///
    /// Metadata fields and fields whose names can't form a file name are
    /// skipped. The document must carry an id. Index writes go through a
    /// temp file and rename so a crash never leaves a half-written index.
    pub fn update_indexes(&self, doc: &Document) -> CoreResult<()> {
        let Some(id) = doc.field(FIELD_ID).as_str() else {
            return Err(CoreError::corrupt_record("indexed document has no id"));
        };
        let id = DocumentId::new(id);

        for (name, value) in doc.iter() {
            if is_metadata_field(name) || !is_indexable_field_name(name) {
                debug!(field = name, "skipping unindexable field");
                continue;
            }

            let mut index = self.load(name)?.unwrap_or_default();
            index.insert(value.clone(), id.clone());
            self.persist(name, &index)?;
        }
        Ok(())
    }

    /// Loads one field's index, or `None` if no index file exists.
    pub fn load(&self, field: &str) -> CoreResult<Option<FieldIndex>> {
        let path = self.dir.index_path(field);
        if !path.exists() {
            return Ok(None);
        }
        let data = FileBackend::open(&path)?.read_all()?;
        Ok(Some(FieldIndex::decode(&data)?))
    }

    /// Returns the document ids recorded for a field value.
    ///
    /// An absent index reads as empty; entries may be stale relative to the
    /// segments.
    pub fn lookup(&self, field: &str, value: &Value) -> CoreResult<Vec<DocumentId>> {
        Ok(self
            .load(field)?
            .map(|index| index.get(value).to_vec())
            .unwrap_or_default())
    }

    /// Deletes every index file of the collection.
    pub fn clear(&self) -> CoreResult<usize> {
        let files = self.dir.list_index_files()?;
        let count = files.len();
        for path in files {
            self.dir.remove_file(&path)?;
        }
        Ok(count)
    }

    fn persist(&self, field: &str, index: &FieldIndex) -> CoreResult<()> {
        let path = self.dir.index_path(field);
        let tmp = path.with_extension("btree.tmp");

        let mut backend = FileBackend::create(&tmp)?;
        backend.append(&index.encode()?)?;
        backend.sync()?;
        drop(backend);

        fs::rename(&tmp, &path)?;
        self.dir.sync_directory()
    }
}
