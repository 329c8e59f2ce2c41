//! # ShelfDB Core
//!
//! Embedded document store engine for ShelfDB.
//!
//! This crate provides:
//! - WAL (Write-Ahead Log) for durable writes
//! - Append-only segment storage with live-count rollover
//! - Per-field secondary indexes
//! - A filter expression engine for queries
//! - Compaction to reclaim space from stale and deleted records
//!
//! # Example
//!
//! ```no_run
//! use shelfdb_core::{field, Database, Document};
//!
//! # fn main() -> shelfdb_core::CoreResult<()> {
//! let db = Database::open("./data")?;
//! let users = db.collection("users")?;
//!
//! let mut doc = Document::new();
//! doc.set("name", "alice");
//! doc.set("age", 30i64);
//! users.insert_one(doc)?;
//!
//! let adults = users.find(Some(&field("age").ge(18i64)))?;
//! assert_eq!(adults.len(), 1);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod config;
mod database;
mod dir;
mod error;
pub mod filter;
mod index;
mod segment;
mod types;
mod wal;

pub use collection::Collection;
pub use config::Config;
pub use database::Database;
pub use error::{CoreError, CoreResult};
pub use filter::{field, Filter};
pub use segment::CompactionStats;
pub use types::{DocumentId, SegmentId};

pub use shelfdb_codec::{Document, TypeTag, Value};
