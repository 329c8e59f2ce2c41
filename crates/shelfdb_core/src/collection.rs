//! Collection handle: the document CRUD surface.

use crate::dir::CollectionDir;
use crate::error::{CoreError, CoreResult};
use crate::filter::Filter;
use crate::index::IndexManager;
use crate::segment::{compact, CompactionStats, SegmentStore};
use crate::types::{is_metadata_field, is_tombstone, DocumentId, FIELD_ID};
use crate::wal::{WalManager, WalOp};
use parking_lot::Mutex;
use shelfdb_codec::Document;
use std::collections::HashMap;
use tracing::debug;

/// A named set of documents.
///
/// Writes queue durably in the collection's WAL and become visible in the
/// segments on the next [`Collection::flush`]; reads flush first, so a
/// single handle always observes its own writes. All operations take the
/// collection-wide write lock, giving single-writer discipline within the
/// process (the database LOCK file covers cross-process access).
#[derive(Debug)]
pub struct Collection {
    name: String,
    inner: Mutex<CollectionInner>,
}

#[derive(Debug)]
struct CollectionInner {
    dir: CollectionDir,
    wal: WalManager,
    segments: SegmentStore,
    indexes: IndexManager,
}

impl Collection {
    pub(crate) fn new(
        name: String,
        dir: CollectionDir,
        sync_on_write: bool,
        segment_capacity: usize,
    ) -> Self {
        Self {
            name,
            inner: Mutex::new(CollectionInner {
                wal: WalManager::new(dir.clone(), sync_on_write),
                segments: SegmentStore::new(dir.clone(), segment_capacity),
                indexes: IndexManager::new(dir.clone()),
                dir,
            }),
        }
    }

    /// Returns the collection's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores a new document and returns its assigned id.
    ///
    /// The document must not carry reserved fields (`_id`, `_op`,
    /// `_deleted`, `_set`). The write is durable when this returns but
    /// only becomes visible to reads on the next flush, which every read
    /// performs implicitly.
    pub fn insert_one(&self, mut doc: Document) -> CoreResult<DocumentId> {
        if let Some((name, _)) = doc.iter().find(|(name, _)| is_metadata_field(name)) {
            return Err(CoreError::invalid_operation(format!(
                "document uses reserved field {name:?}"
            )));
        }

        let id = DocumentId::generate();
        doc.set(FIELD_ID, id.as_str());

        let inner = self.inner.lock();
        inner.wal.append(&WalOp::Insert { doc })?;
        debug!(collection = %self.name, id = %id, "insert queued");
        Ok(id)
    }

    /// Overwrites some fields of an existing document.
    ///
    /// Fields absent from `set` keep their values. Reserved fields cannot
    /// be overwritten. An id with no live document is dropped with a
    /// warning at flush time rather than failing the update.
    pub fn update_one(&self, id: &DocumentId, set: Document) -> CoreResult<()> {
        if let Some((name, _)) = set.iter().find(|(name, _)| is_metadata_field(name)) {
            return Err(CoreError::invalid_operation(format!(
                "update targets reserved field {name:?}"
            )));
        }

        let inner = self.inner.lock();
        inner.wal.append(&WalOp::Update {
            id: id.clone(),
            set,
        })
    }

    /// Removes a document. A missing id is dropped at flush time.
    pub fn delete_one(&self, id: &DocumentId) -> CoreResult<()> {
        let inner = self.inner.lock();
        inner.wal.append(&WalOp::Delete { id: id.clone() })
    }

    /// Returns every live document matching the filter, or all of them
    /// when no filter is given.
    ///
    /// Pending writes are flushed first. Documents come back in first
    /// insertion order with the latest version of each, tombstoned
    /// documents excluded, `_id` included.
    pub fn find(&self, filter: Option<&Filter>) -> CoreResult<Vec<Document>> {
        let inner = self.inner.lock();
        inner.wal.replay_and_clear(&inner.segments, &inner.indexes)?;

        let mut order: Vec<String> = Vec::new();
        let mut latest: HashMap<String, Document> = HashMap::new();
        for record in inner.segments.scan()? {
            let record = record?;
            let Some(id) = record.field(FIELD_ID).as_str() else {
                continue;
            };
            let id = id.to_string();
            if latest.insert(id.clone(), record).is_none() {
                order.push(id);
            }
        }

        let mut results = Vec::new();
        for id in &order {
            let doc = &latest[id];
            if is_tombstone(doc) {
                continue;
            }
            if filter.is_none_or(|f| f.test(doc)) {
                results.push(doc.clone());
            }
        }
        Ok(results)
    }

    /// Returns one live document by id, flushing pending writes first.
    pub fn get(&self, id: &DocumentId) -> CoreResult<Option<Document>> {
        let inner = self.inner.lock();
        inner.wal.replay_and_clear(&inner.segments, &inner.indexes)?;
        inner.segments.find_latest(id)
    }

    /// Applies all pending WAL operations to the segments and indexes.
    ///
    /// Returns the number of operations applied.
    pub fn flush(&self) -> CoreResult<usize> {
        let inner = self.inner.lock();
        inner.wal.replay_and_clear(&inner.segments, &inner.indexes)
    }

    /// Compacts the collection down to its live documents.
    ///
    /// Stale versions and tombstones are dropped, segments are repacked
    /// densely, and every index is rebuilt from live data. Document ids
    /// are preserved.
    pub fn defragment(&self) -> CoreResult<CompactionStats> {
        let inner = self.inner.lock();
        compact(&inner.wal, &inner.segments, &inner.indexes, &inner.dir)
    }
}
