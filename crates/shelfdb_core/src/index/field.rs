//! A single field's value-to-documents index.

use crate::error::{CoreError, CoreResult};
use crate::types::DocumentId;
use shelfdb_codec::{decode_frame, encode_document, Document, Value};
use std::collections::BTreeMap;

const ENTRIES_FIELD: &str = "entries";

/// An ordered mapping from field values to the documents carrying them.
///
/// Values order by type rank first (null, bool, int, float, str, list,
/// map), then within type. Each bucket keeps document ids in insertion
/// order, duplicates included; the read path resolves them against the
/// segments anyway.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldIndex {
    buckets: BTreeMap<Value, Vec<DocumentId>>,
}

impl FieldIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a document carries a value.
    pub fn insert(&mut self, value: Value, id: DocumentId) {
        self.buckets.entry(value).or_default().push(id);
    }

    /// Returns the document ids recorded for a value.
    #[must_use]
    pub fn get(&self, value: &Value) -> &[DocumentId] {
        self.buckets.get(value).map_or(&[], Vec::as_slice)
    }

    /// Iterates buckets in value order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &[DocumentId])> {
        self.buckets.iter().map(|(v, ids)| (v, ids.as_slice()))
    }

    /// Returns the number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns whether the index has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Serializes the index as one record frame.
    ///
    /// The layout is a document whose `entries` field lists
    /// `[value, [id, ...]]` pairs in bucket order.
    pub fn encode(&self) -> CoreResult<Vec<u8>> {
        let entries: Vec<Value> = self
            .buckets
            .iter()
            .map(|(value, ids)| {
                let id_list = ids
                    .iter()
                    .map(|id| Value::Str(id.as_str().to_string()))
                    .collect();
                Value::List(vec![value.clone(), Value::List(id_list)])
            })
            .collect();

        let mut doc = Document::new();
        doc.set(ENTRIES_FIELD, Value::List(entries));
        Ok(encode_document(&doc)?)
    }

    /// Deserializes an index from its record frame.
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        let (doc, _) = decode_frame(data)?;
        let Some(Value::List(entries)) = doc.get(ENTRIES_FIELD) else {
            return Err(CoreError::corrupt_record("index file missing entries"));
        };

        let mut index = Self::new();
        for entry in entries {
            let Value::List(pair) = entry else {
                return Err(CoreError::corrupt_record("index entry is not a pair"));
            };
            let [value, Value::List(ids)] = pair.as_slice() else {
                return Err(CoreError::corrupt_record("index entry is not a pair"));
            };
            for id in ids {
                let Value::Str(id) = id else {
                    return Err(CoreError::corrupt_record("index entry id is not a string"));
                };
                index.insert(value.clone(), DocumentId::new(id.clone()));
            }
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_keep_insertion_order() {
        let mut index = FieldIndex::new();
        index.insert(Value::Int(5), DocumentId::new("b"));
        index.insert(Value::Int(5), DocumentId::new("a"));
        index.insert(Value::Int(5), DocumentId::new("b"));

        let ids: Vec<&str> = index
            .get(&Value::Int(5))
            .iter()
            .map(DocumentId::as_str)
            .collect();
        assert_eq!(ids, vec!["b", "a", "b"]);
    }

    #[test]
    fn missing_value_is_empty() {
        let index = FieldIndex::new();
        assert!(index.get(&Value::Int(1)).is_empty());
    }

    #[test]
    fn iterates_in_value_order() {
        let mut index = FieldIndex::new();
        index.insert(Value::Str("zed".into()), DocumentId::new("1"));
        index.insert(Value::Int(3), DocumentId::new("2"));
        index.insert(Value::Bool(true), DocumentId::new("3"));

        let values: Vec<Value> = index.iter().map(|(v, _)| v.clone()).collect();
        assert_eq!(
            values,
            vec![Value::Bool(true), Value::Int(3), Value::Str("zed".into())]
        );
    }

    #[test]
    fn encode_decode_roundtrip() {
        let mut index = FieldIndex::new();
        index.insert(Value::Int(1), DocumentId::new("a"));
        index.insert(Value::Int(1), DocumentId::new("b"));
        index.insert(Value::Str("x".into()), DocumentId::new("c"));
        index.insert(Value::Null, DocumentId::new("d"));
        index.insert(Value::Float(2.5), DocumentId::new("e"));

        let decoded = FieldIndex::decode(&index.encode().unwrap()).unwrap();
        assert_eq!(decoded, index);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(FieldIndex::decode(&[0, 1, 2, 3]).is_err());

        let mut doc = Document::new();
        doc.set("wrong", Value::Int(1));
        let frame = encode_document(&doc).unwrap();
        assert!(FieldIndex::decode(&frame).is_err());
    }
}
