//! WAL appending and replay.

use crate::dir::CollectionDir;
use crate::error::CoreResult;
use crate::index::IndexManager;
use crate::segment::SegmentStore;
use crate::types::{FIELD_DELETED, FIELD_ID};
use crate::wal::record::WalOp;
use shelfdb_codec::{encode_document, Document, DocumentReader};
use shelfdb_storage::{FileBackend, StorageBackend};
use tracing::{debug, warn};

/// Appends operations to a collection's WAL and replays them on flush.
#[derive(Debug)]
pub struct WalManager {
    dir: CollectionDir,
    sync_on_write: bool,
}

impl WalManager {
    /// Creates a manager over a collection directory.
    #[must_use]
    pub fn new(dir: CollectionDir, sync_on_write: bool) -> Self {
        Self { dir, sync_on_write }
    }

    /// Appends one operation to the WAL.
    ///
    /// When `sync_on_write` is set the record is fsynced before this
    /// returns; the operation then survives a crash even though the
    /// segments haven't seen it yet.
    pub fn append(&self, op: &WalOp) -> CoreResult<()> {
        let frame = encode_document(&op.to_document())?;
        let mut backend = FileBackend::open_with_create_dirs(&self.dir.wal_path())?;
        backend.append(&frame)?;
        if self.sync_on_write {
            backend.sync()?;
        } else {
            backend.flush()?;
        }
        Ok(())
    }

    /// Returns whether a WAL file with pending operations exists.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.dir.wal_path().exists()
    }

    /// Replays every pending operation into the segments and indexes, then
    /// deletes the WAL file.
    ///
    /// Returns the number of operations applied. A missing WAL file means
    /// nothing is pending. Updates and deletes for ids with no live
    /// version are logged and dropped; index write failures are logged and
    /// ignored since compaction rebuilds indexes from the segments.
    pub fn replay_and_clear(
        &self,
        segments: &SegmentStore,
        indexes: &IndexManager,
    ) -> CoreResult<usize> {
        if !self.has_pending() {
            return Ok(0);
        }
        let data = FileBackend::open(&self.dir.wal_path())?.read_all()?;

        let mut applied = 0;
        for record in DocumentReader::new(&data) {
            let op = WalOp::from_document(record?)?;
            self.apply(op, segments, indexes)?;
            applied += 1;
        }

        self.dir.remove_file(&self.dir.wal_path())?;
        debug!(applied, "WAL replayed and cleared");
        Ok(applied)
    }

    fn apply(
        &self,
        op: WalOp,
        segments: &SegmentStore,
        indexes: &IndexManager,
    ) -> CoreResult<()> {
        match op {
            WalOp::Insert { doc } => {
                self.place(&doc, segments)?;
                self.index(&doc, indexes);
            }
            WalOp::Update { id, set } => {
                let Some(mut current) = segments.find_latest(&id)? else {
                    warn!(id = %id, "dropping update for unknown document");
                    return Ok(());
                };
                current.merge(&set);
                self.place(&current, segments)?;
                self.index(&current, indexes);
            }
            WalOp::Delete { id } => {
                if segments.find_latest(&id)?.is_none() {
                    warn!(id = %id, "dropping delete for unknown document");
                    return Ok(());
                }
                let mut tombstone = Document::new();
                tombstone.set(FIELD_ID, id.as_str());
                tombstone.set(FIELD_DELETED, true);
                self.place(&tombstone, segments)?;
            }
        }
        Ok(())
    }

    fn place(&self, doc: &Document, segments: &SegmentStore) -> CoreResult<()> {
        let target = segments.pick_placement_target()?;
        segments.append(target, doc)
    }

    fn index(&self, doc: &Document, indexes: &IndexManager) {
        if let Err(err) = indexes.update_indexes(doc) {
            warn!(error = %err, "index update failed, continuing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dir::DatabaseDir;
    use crate::types::DocumentId;
    use shelfdb_codec::Value;
    use tempfile::tempdir;

    struct Fixture {
        _temp: tempfile::TempDir,
        wal: WalManager,
        segments: SegmentStore,
        indexes: IndexManager,
    }

    fn fixture() -> Fixture {
        let temp = tempdir().unwrap();
        let db = DatabaseDir::open(temp.path(), true).unwrap();
        let dir = db.ensure_collection("c").unwrap();
        Fixture {
            _temp: temp,
            wal: WalManager::new(dir.clone(), true),
            segments: SegmentStore::new(dir.clone(), 10),
            indexes: IndexManager::new(dir),
        }
    }

    fn insert(id: &str, age: i64) -> WalOp {
        let mut doc = Document::new();
        doc.set(FIELD_ID, id);
        doc.set("age", age);
        WalOp::Insert { doc }
    }

    #[test]
    fn append_then_replay_applies_inserts() {
        let f = fixture();
        f.wal.append(&insert("d1", 30)).unwrap();
        f.wal.append(&insert("d2", 40)).unwrap();
        assert!(f.wal.has_pending());

        let applied = f.wal.replay_and_clear(&f.segments, &f.indexes).unwrap();
        assert_eq!(applied, 2);
        assert!(!f.wal.has_pending());

        let doc = f
            .segments
            .find_latest(&DocumentId::new("d1"))
            .unwrap()
            .unwrap();
        assert_eq!(doc.field("age"), &Value::Int(30));

        // Indexes were refreshed during replay
        let ids = f.indexes.lookup("age", &Value::Int(40)).unwrap();
        assert_eq!(ids, vec![DocumentId::new("d2")]);
    }

    #[test]
    fn replay_without_wal_is_noop() {
        let f = fixture();
        assert_eq!(f.wal.replay_and_clear(&f.segments, &f.indexes).unwrap(), 0);
    }

    #[test]
    fn update_merges_into_latest() {
        let f = fixture();
        f.wal.append(&insert("d1", 30)).unwrap();

        let mut set = Document::new();
        set.set("age", 31i64);
        set.set("city", "lisbon");
        f.wal
            .append(&WalOp::Update {
                id: DocumentId::new("d1"),
                set,
            })
            .unwrap();

        f.wal.replay_and_clear(&f.segments, &f.indexes).unwrap();

        let doc = f
            .segments
            .find_latest(&DocumentId::new("d1"))
            .unwrap()
            .unwrap();
        assert_eq!(doc.field("age"), &Value::Int(31));
        assert_eq!(doc.field("city"), &Value::from("lisbon"));
    }

    #[test]
    fn delete_writes_tombstone() {
        let f = fixture();
        f.wal.append(&insert("d1", 30)).unwrap();
        f.wal
            .append(&WalOp::Delete {
                id: DocumentId::new("d1"),
            })
            .unwrap();

        let applied = f.wal.replay_and_clear(&f.segments, &f.indexes).unwrap();
        assert_eq!(applied, 2);
        assert!(f.segments.find_latest(&DocumentId::new("d1")).unwrap().is_none());
    }

    #[test]
    fn unknown_targets_are_dropped() {
        let f = fixture();
        f.wal
            .append(&WalOp::Delete {
                id: DocumentId::new("ghost"),
            })
            .unwrap();
        f.wal
            .append(&WalOp::Update {
                id: DocumentId::new("ghost"),
                set: Document::new(),
            })
            .unwrap();
        f.wal.append(&insert("d1", 30)).unwrap();

        // All three records count as applied; the unknown targets just
        // produce no segment writes.
        let applied = f.wal.replay_and_clear(&f.segments, &f.indexes).unwrap();
        assert_eq!(applied, 3);
        assert_eq!(f.segments.scan().unwrap().count(), 1);
    }

    #[test]
    fn wal_survives_crash_until_replayed() {
        let f = fixture();
        f.wal.append(&insert("d1", 30)).unwrap();

        // A fresh manager over the same directory sees the pending record,
        // as a process restart would.
        let wal2 = WalManager::new(f.segments_dir(), true);
        assert!(wal2.has_pending());
        assert_eq!(wal2.replay_and_clear(&f.segments, &f.indexes).unwrap(), 1);
    }

    impl Fixture {
        fn segments_dir(&self) -> crate::dir::CollectionDir {
            self.wal.dir.clone()
        }
    }
}
