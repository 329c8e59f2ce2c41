//! Segment compaction.

use crate::dir::CollectionDir;
use crate::error::CoreResult;
use crate::index::IndexManager;
use crate::segment::store::SegmentStore;
use crate::types::{is_tombstone, FIELD_ID};
use crate::wal::{WalManager, WalOp};
use shelfdb_codec::Document;
use std::collections::HashMap;
use tracing::info;

/// Counters reported by a compaction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactionStats {
    /// Records read from the old segments.
    pub input_records: usize,
    /// Documents that survived into the new segments.
    pub live_documents: usize,
    /// Deleted documents whose tombstones were dropped.
    pub tombstones_dropped: usize,
    /// Stale record versions superseded by newer writes.
    pub superseded_dropped: usize,
    /// Old segment files removed.
    pub segments_removed: usize,
}

/// Rewrites a collection down to its live documents.
///
/// Pending WAL operations are flushed first, then every record is scanned
/// and only the latest non-tombstone version per document survives. The old
/// segment and index files are removed and the survivors are re-inserted
/// through the WAL with their ids preserved, which repacks the segments
/// densely and rebuilds every index from live data.
///
/// Survivors keep their first-seen order, so a find after compaction
/// returns documents in the same order as before.
pub fn compact(
    wal: &WalManager,
    segments: &SegmentStore,
    indexes: &IndexManager,
    dir: &CollectionDir,
) -> CoreResult<CompactionStats> {
    wal.replay_and_clear(segments, indexes)?;

    let mut stats = CompactionStats::default();
    let mut order: Vec<String> = Vec::new();
    let mut latest: HashMap<String, Document> = HashMap::new();

    for record in segments.scan()? {
        let record = record?;
        stats.input_records += 1;

        let Some(id) = record.field(FIELD_ID).as_str() else {
            continue;
        };
        let id = id.to_string();
        if latest.insert(id.clone(), record).is_some() {
            stats.superseded_dropped += 1;
        } else {
            order.push(id);
        }
    }

    let old_segments = dir.list_segments()?;
    stats.segments_removed = old_segments.len();
    for id in old_segments {
        dir.remove_file(&dir.segment_path(id))?;
    }
    indexes.clear()?;

    for id in &order {
        let doc = &latest[id];
        if is_tombstone(doc) {
            stats.tombstones_dropped += 1;
            continue;
        }
        wal.append(&WalOp::Insert { doc: doc.clone() })?;
        stats.live_documents += 1;
    }
    wal.replay_and_clear(segments, indexes)?;

    info!(
        input = stats.input_records,
        live = stats.live_documents,
        "compaction finished"
    );
    Ok(stats)
}
