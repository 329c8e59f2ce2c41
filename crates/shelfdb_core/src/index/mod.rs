//! Secondary field indexes.
//!
//! Every document write refreshes one index file per top-level field
//! (`index_<field>.btree`). Indexes are advisory: they may lag behind the
//! segments when an index write fails, and readers must tolerate stale or
//! missing entries. Compaction rebuilds them from live data.

mod field;
mod manager;

pub use manager::IndexManager;
