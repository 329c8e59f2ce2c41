//! Append-only segment storage.
//!
//! Documents live in numbered segment files (`data_NNNNNN.bson`). Records
//! are only ever appended; updates write a fresh full record and deletes
//! write a tombstone. The latest record for a document id wins at read
//! time. A segment accepts new inserts until it holds a configured number
//! of live documents, after which writes roll over to the next segment.

mod compaction;
mod store;

pub use compaction::{compact, CompactionStats};
pub use store::SegmentStore;
