//! Segment file reading and writing.

use crate::dir::CollectionDir;
use crate::error::CoreResult;
use crate::types::{is_tombstone, DocumentId, SegmentId, FIELD_ID};
use shelfdb_codec::{decode_frame, encode_document, Document, DocumentReader};
use shelfdb_storage::{FileBackend, StorageBackend};
use std::collections::HashMap;

/// Reads and writes a collection's append-only segment files.
///
/// The store is stateless between calls; every operation re-derives what it
/// needs from the directory listing, so segment files created or removed by
/// compaction are picked up automatically.
#[derive(Debug)]
pub struct SegmentStore {
    dir: CollectionDir,
    capacity: usize,
}

impl SegmentStore {
    /// Creates a store over a collection directory.
    #[must_use]
    pub fn new(dir: CollectionDir, capacity: usize) -> Self {
        Self { dir, capacity }
    }

    /// Picks the segment that should receive the next record.
    ///
    /// Scans existing segments newest to oldest and returns the first with
    /// room for another live document, or the next unused id when all are
    /// full. The first segment of a collection is `data_000001.bson`.
    pub fn pick_placement_target(&self) -> CoreResult<SegmentId> {
        let segments = self.dir.list_segments()?;
        for &id in segments.iter().rev() {
            if self.live_count(id)? < self.capacity {
                return Ok(id);
            }
        }
        Ok(segments.last().map_or(SegmentId::new(1), |id| id.next()))
    }

    /// Counts live documents in one segment.
    ///
    /// The last record per id within the segment wins; tombstoned winners
    /// don't count as live.
    pub fn live_count(&self, id: SegmentId) -> CoreResult<usize> {
        let data = FileBackend::open(&self.dir.segment_path(id))?.read_all()?;

        let mut latest: HashMap<String, bool> = HashMap::new();
        for record in DocumentReader::new(&data) {
            let record = record?;
            if let Some(doc_id) = record.field(FIELD_ID).as_str() {
                latest.insert(doc_id.to_string(), is_tombstone(&record));
            }
        }

        Ok(latest.values().filter(|deleted| !**deleted).count())
    }

    /// Appends one record to a segment, creating the file if needed.
    pub fn append(&self, id: SegmentId, doc: &Document) -> CoreResult<()> {
        let frame = encode_document(doc)?;
        let mut backend = FileBackend::open_with_create_dirs(&self.dir.segment_path(id))?;
        backend.append(&frame)?;
        backend.sync()?;
        Ok(())
    }

    /// Returns an iterator over every record in the collection.
    ///
    /// Records come back in write order: oldest segment first, and within a
    /// segment in file order. Later records for the same id supersede
    /// earlier ones; resolving that is the caller's job.
    pub fn scan(&self) -> CoreResult<SegmentScan> {
        let segments = self.dir.list_segments()?;
        let mut files = Vec::with_capacity(segments.len());
        for id in segments {
            files.push(self.dir.segment_path(id));
        }
        files.reverse();
        Ok(SegmentScan {
            files,
            buffer: Vec::new(),
            pos: 0,
            failed: false,
        })
    }

    /// Returns the latest live version of a document, if any.
    ///
    /// Scans every record; the last one carrying the id wins. Returns
    /// `None` when the id was never written or its latest record is a
    /// tombstone.
    pub fn find_latest(&self, id: &DocumentId) -> CoreResult<Option<Document>> {
        let mut latest = None;
        for record in self.scan()? {
            let record = record?;
            if record.field(FIELD_ID).as_str() == Some(id.as_str()) {
                latest = Some(record);
            }
        }
        Ok(latest.filter(|doc| !is_tombstone(doc)))
    }
}

/// Streaming iterator over all segment records of a collection.
///
/// Stops at the first decode error after yielding it once.
pub struct SegmentScan {
    /// Remaining segment files, newest first so `pop` yields oldest first.
    files: Vec<std::path::PathBuf>,
    buffer: Vec<u8>,
    pos: usize,
    failed: bool,
}

impl Iterator for SegmentScan {
    type Item = CoreResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if self.pos < self.buffer.len() {
                match decode_frame(&self.buffer[self.pos..]) {
                    Ok((doc, consumed)) => {
                        self.pos += consumed;
                        return Some(Ok(doc));
                    }
                    Err(err) => {
                        self.failed = true;
                        return Some(Err(err.into()));
                    }
                }
            }

            let path = self.files.pop()?;
            match FileBackend::open(&path).and_then(|backend| backend.read_all()) {
                Ok(data) => {
                    self.buffer = data;
                    self.pos = 0;
                }
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err.into()));
                }
            }
        }
    }
}
