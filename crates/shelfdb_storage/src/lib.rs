//! # ShelfDB Storage
//!
//! Storage backend trait and file implementation for ShelfDB.
//!
//! This crate provides the lowest-level storage abstraction for ShelfDB.
//! Storage backends are **opaque byte stores** - they do not interpret
//! the data they store.
//!
//! ## Design Principles
//!
//! - Backends are simple byte stores (read, append, flush)
//! - No knowledge of ShelfDB record framing, WAL files, or segments
//! - Backends are short-lived scoped handles: the engine opens one per
//!   WAL/segment/index file operation and drops it when done
//! - ShelfDB owns all file format interpretation
//!
//! ## Example
//!
//! ```no_run
//! use shelfdb_storage::{StorageBackend, FileBackend};
//! use std::path::Path;
//!
//! let mut backend = FileBackend::open(Path::new("data.bin")).unwrap();
//! let offset = backend.append(b"hello world").unwrap();
//! let data = backend.read_at(offset, 11).unwrap();
//! assert_eq!(&data, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
