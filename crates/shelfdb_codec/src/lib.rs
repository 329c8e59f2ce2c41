//! # ShelfDB Codec
//!
//! Framed binary document encoding/decoding for ShelfDB.
//!
//! This crate defines the dynamic [`Value`] union and the ordered
//! [`Document`] mapping, and serializes documents as self-describing
//! records:
//!
//! ```text
//! record frame:
//!     total_len: u32 LE    # includes this field and the CRC
//!     payload              # encoded document body
//!     crc32: u32 LE        # over everything before it
//! ```
//!
//! Frames carry no cross-record dependency, so a reader can decode a
//! concatenation of frames one at a time in a single streaming pass via
//! [`DocumentReader`].
//!
//! ## Usage
//!
//! ```
//! use shelfdb_codec::{encode_document, DocumentReader, Document, Value};
//!
//! let mut doc = Document::new();
//! doc.set("name", Value::from("alice"));
//!
//! let bytes = encode_document(&doc).unwrap();
//! let decoded: Vec<_> = DocumentReader::new(&bytes)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(decoded, vec![doc]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod document;
mod encoder;
mod error;
mod value;

pub use decoder::{decode_frame, DocumentReader};
pub use document::Document;
pub use encoder::{compute_crc32, encode_document};
pub use error::{CodecError, CodecResult};
pub use value::{TypeTag, Value};
