//! Write-ahead log.
//!
//! Every mutation is first appended to the collection's `wal.bson` file
//! and made durable before the call returns. `flush` later replays the
//! pending operations into the segments and indexes and deletes the file.
//! A crash between those two steps replays the WAL again on the next
//! flush; re-applied records collapse under last-write-wins at read time.

mod manager;
mod record;

pub use manager::WalManager;
pub use record::WalOp;
