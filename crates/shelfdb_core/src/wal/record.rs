//! WAL record encoding.

use crate::error::{CoreError, CoreResult};
use crate::types::{DocumentId, FIELD_ID, FIELD_OP, FIELD_SET};
use shelfdb_codec::{Document, Value};

const OP_INSERT: &str = "insert";
const OP_UPDATE: &str = "update";
const OP_DELETE: &str = "delete";

/// A pending mutation queued in the write-ahead log.
#[derive(Debug, Clone, PartialEq)]
pub enum WalOp {
    /// Store a new document. The document already carries its `_id`.
    Insert {
        /// The full document, id included.
        doc: Document,
    },
    /// Overwrite some fields of an existing document.
    Update {
        /// Target document id.
        id: DocumentId,
        /// Fields to overwrite; untouched fields keep their values.
        set: Document,
    },
    /// Remove a document.
    Delete {
        /// Target document id.
        id: DocumentId,
    },
}

impl WalOp {
    /// Converts the operation into its on-disk record document.
    ///
    /// The record is the payload tagged with `_op`; updates carry the
    /// partial document under `_set`.
    #[must_use]
    pub fn to_document(&self) -> Document {
        match self {
            Self::Insert { doc } => {
                let mut record = doc.clone();
                record.set(FIELD_OP, OP_INSERT);
                record
            }
            Self::Update { id, set } => {
                let mut record = Document::new();
                record.set(FIELD_OP, OP_UPDATE);
                record.set(FIELD_ID, id.as_str());
                let fields = set
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect();
                record.set(FIELD_SET, Value::Map(fields));
                record
            }
            Self::Delete { id } => {
                let mut record = Document::new();
                record.set(FIELD_OP, OP_DELETE);
                record.set(FIELD_ID, id.as_str());
                record
            }
        }
    }

    /// Parses an operation back out of its on-disk record document.
    pub fn from_document(mut record: Document) -> CoreResult<Self> {
        let op = match record.remove(FIELD_OP) {
            Some(Value::Str(op)) => op,
            _ => return Err(CoreError::corrupt_record("WAL record has no operation tag")),
        };

        match op.as_str() {
            OP_INSERT => {
                if record.field(FIELD_ID).as_str().is_none() {
                    return Err(CoreError::corrupt_record("WAL insert record has no id"));
                }
                Ok(Self::Insert { doc: record })
            }
            OP_UPDATE => {
                let id = record_id(&record)?;
                let set = match record.remove(FIELD_SET) {
                    Some(Value::Map(fields)) => fields.into_iter().collect(),
                    _ => {
                        return Err(CoreError::corrupt_record(
                            "WAL update record has no field map",
                        ))
                    }
                };
                Ok(Self::Update { id, set })
            }
            OP_DELETE => Ok(Self::Delete {
                id: record_id(&record)?,
            }),
            other => Err(CoreError::corrupt_record(format!(
                "unknown WAL operation: {other:?}"
            ))),
        }
    }
}

fn record_id(record: &Document) -> CoreResult<DocumentId> {
    record
        .field(FIELD_ID)
        .as_str()
        .map(DocumentId::new)
        .ok_or_else(|| CoreError::corrupt_record("WAL record has no id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_roundtrip() {
        let mut doc = Document::new();
        doc.set(FIELD_ID, "d1");
        doc.set("name", "alice");

        let op = WalOp::Insert { doc };
        let parsed = WalOp::from_document(op.to_document()).unwrap();
        assert_eq!(parsed, op);
    }

    #[test]
    fn update_roundtrip() {
        let mut set = Document::new();
        set.set("age", 31i64);
        set.set("city", "lisbon");

        let op = WalOp::Update {
            id: DocumentId::new("d1"),
            set,
        };
        let parsed = WalOp::from_document(op.to_document()).unwrap();
        assert_eq!(parsed, op);
    }

    #[test]
    fn delete_roundtrip() {
        let op = WalOp::Delete {
            id: DocumentId::new("d1"),
        };
        let parsed = WalOp::from_document(op.to_document()).unwrap();
        assert_eq!(parsed, op);
    }

    #[test]
    fn rejects_malformed_records() {
        // No operation tag
        let mut record = Document::new();
        record.set(FIELD_ID, "d1");
        assert!(WalOp::from_document(record).is_err());

        // Unknown operation
        let mut record = Document::new();
        record.set(FIELD_OP, "upsert");
        record.set(FIELD_ID, "d1");
        assert!(WalOp::from_document(record).is_err());

        // Update without a field map
        let mut record = Document::new();
        record.set(FIELD_OP, "update");
        record.set(FIELD_ID, "d1");
        assert!(WalOp::from_document(record).is_err());

        // Insert without an id
        let mut record = Document::new();
        record.set(FIELD_OP, "insert");
        record.set("x", 1i64);
        assert!(WalOp::from_document(record).is_err());
    }
}
