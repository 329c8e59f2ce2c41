//! Core type definitions for ShelfDB.

use shelfdb_codec::Document;
use std::fmt;
use uuid::Uuid;

/// Reserved field holding a document's globally unique id.
pub const FIELD_ID: &str = "_id";
/// Reserved field tagging the operation kind inside WAL records.
pub const FIELD_OP: &str = "_op";
/// Reserved field marking a record as a tombstone.
pub const FIELD_DELETED: &str = "_deleted";
/// Reserved field carrying the partial overwrite of an update record.
pub const FIELD_SET: &str = "_set";

/// Returns whether a field name is reserved engine metadata.
#[must_use]
pub fn is_metadata_field(name: &str) -> bool {
    matches!(name, FIELD_ID | FIELD_OP | FIELD_DELETED | FIELD_SET)
}

/// Returns whether a record is a tombstone.
#[must_use]
pub fn is_tombstone(doc: &Document) -> bool {
    doc.field(FIELD_DELETED).as_bool() == Some(true)
}

/// Unique identifier for a logical document.
///
/// Assigned at insert time and immutable afterwards; identifies the
/// document across every segment of its collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier for a segment file within a collection.
///
/// Segment ids are monotonically increasing; higher ids are newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(u64);

impl SegmentId {
    /// Creates a segment id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the id of the segment created after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the segment's file name, e.g. `data_000001.bson`.
    ///
    /// Ids are zero-padded so lexicographic file name order matches
    /// numeric id order.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("data_{:06}.bson", self.0)
    }

    /// Parses a segment id from a file name, if it is a segment file.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let digits = name.strip_prefix("data_")?.strip_suffix(".bson")?;
        digits.parse().ok().map(Self)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seg:{}", self.0)
    }
}
