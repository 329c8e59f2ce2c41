//! Ordered document mapping.

use crate::value::Value;

const NULL: Value = Value::Null;

/// An ordered mapping from field names to [`Value`]s.
///
/// Field insertion order is preserved; setting an existing field replaces
/// its value in place. Reading an absent field through [`Document::field`]
/// yields the null value, which is how the filter engine treats missing
/// fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    fields: Vec<(String, Value)>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Returns the value of a field, or `None` if absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Returns the value of a field, reading an absent field as null.
    #[must_use]
    pub fn field(&self, name: &str) -> &Value {
        self.get(name).unwrap_or(&NULL)
    }

    /// Removes a field, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self.fields.iter().position(|(k, _)| k == name)?;
        Some(self.fields.remove(pos).1)
    }

    /// Returns whether the document contains a field.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }

    /// Overwrites fields of this document with those of `other`.
    ///
    /// Existing fields keep their position; new fields append at the end.
    pub fn merge(&mut self, other: &Document) {
        for (name, value) in other.iter() {
            self.set(name, value.clone());
        }
    }

    /// Iterates over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether the document has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (name, value) in iter {
            doc.set(name, value);
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut doc = Document::new();
        doc.set("name", "alice");
        doc.set("age", 30i64);

        assert_eq!(doc.get("name"), Some(&Value::from("alice")));
        assert_eq!(doc.get("age"), Some(&Value::Int(30)));
        assert_eq!(doc.get("missing"), None);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn absent_field_reads_as_null() {
        let doc = Document::new();
        assert_eq!(doc.field("anything"), &Value::Null);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut doc = Document::new();
        doc.set("a", 1i64);
        doc.set("b", 2i64);
        doc.set("a", 10i64);

        let names: Vec<_> = doc.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(doc.field("a"), &Value::Int(10));
    }

    #[test]
    fn remove_field() {
        let mut doc = Document::new();
        doc.set("x", 1i64);

        assert_eq!(doc.remove("x"), Some(Value::Int(1)));
        assert_eq!(doc.remove("x"), None);
        assert!(doc.is_empty());
    }

    #[test]
    fn merge_overwrites_and_appends() {
        let mut base = Document::new();
        base.set("a", 1i64);
        base.set("b", 2i64);

        let mut patch = Document::new();
        patch.set("b", 20i64);
        patch.set("c", 30i64);

        base.merge(&patch);

        let fields: Vec<_> = base.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        assert_eq!(
            fields,
            vec![
                ("a".to_string(), Value::Int(1)),
                ("b".to_string(), Value::Int(20)),
                ("c".to_string(), Value::Int(30)),
            ]
        );
    }

    #[test]
    fn from_iterator() {
        let doc: Document = vec![
            ("k".to_string(), Value::Int(1)),
            ("k".to_string(), Value::Int(2)),
        ]
        .into_iter()
        .collect();

        assert_eq!(doc.len(), 1);
        assert_eq!(doc.field("k"), &Value::Int(2));
    }
}
