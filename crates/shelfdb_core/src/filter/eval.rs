//! Filter evaluation against documents.

use crate::filter::{CompareOp, Filter};
use shelfdb_codec::{Document, Value};
use std::borrow::Cow;
use std::cmp::Ordering;

impl Filter {
    /// Evaluates the filter against one document.
    ///
    /// A missing field reads as null. Ordered comparisons across
    /// incomparable types are false rather than an error, as are string
    /// operators on non-string values. Regex operators search the value's
    /// string form, so they apply to any type.
    #[must_use]
    pub fn test(&self, doc: &Document) -> bool {
        match self {
            Filter::Compare { field, op } => op.test(doc.field(field)),
            Filter::And(left, right) => left.test(doc) && right.test(doc),
            Filter::Or(left, right) => left.test(doc) || right.test(doc),
        }
    }
}

impl CompareOp {
    fn test(&self, value: &Value) -> bool {
        match self {
            CompareOp::Eq(operand) => value == operand,
            CompareOp::Ne(operand) => value != operand,
            CompareOp::Lt(operand) => ordered(value, operand, Ordering::is_lt),
            CompareOp::Le(operand) => ordered(value, operand, Ordering::is_le),
            CompareOp::Gt(operand) => ordered(value, operand, Ordering::is_gt),
            CompareOp::Ge(operand) => ordered(value, operand, Ordering::is_ge),
            CompareOp::In(set) => set.contains(value),
            CompareOp::NotIn(set) => !set.contains(value),
            CompareOp::Matches(pattern) => pattern.is_match(&string_form(value)),
            CompareOp::NotMatches(pattern) => !pattern.is_match(&string_form(value)),
            CompareOp::IsNone => value.is_null(),
            CompareOp::NotNone => !value.is_null(),
            CompareOp::StartsWith(prefix) => {
                value.as_str().is_some_and(|s| s.starts_with(prefix))
            }
            CompareOp::EndsWith(suffix) => {
                value.as_str().is_some_and(|s| s.ends_with(suffix))
            }
            CompareOp::Contains(needle) => {
                value.as_str().is_some_and(|s| s.contains(needle.as_str()))
            }
            CompareOp::NotContains(needle) => {
                value.as_str().is_some_and(|s| !s.contains(needle.as_str()))
            }
            CompareOp::Between(low, high) => {
                ordered(value, low, Ordering::is_ge) && ordered(value, high, Ordering::is_le)
            }
            CompareOp::NotBetween(low, high) => {
                !(ordered(value, low, Ordering::is_ge) && ordered(value, high, Ordering::is_le))
            }
            CompareOp::IsType(tag) => value.type_tag() == *tag,
            CompareOp::LenEq(len) => value.len() == Some(*len),
            CompareOp::LenGt(len) => value.len().is_some_and(|l| l > *len),
            CompareOp::LenLt(len) => value.len().is_some_and(|l| l < *len),
        }
    }
}

fn ordered(value: &Value, operand: &Value, accept: fn(Ordering) -> bool) -> bool {
    value
        .partial_cmp_ordered(operand)
        .is_some_and(accept)
}

/// The text a regex pattern searches: strings as-is, everything else
/// through its rendered form.
fn string_form(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Str(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::field;
    use regex::Regex;
    use shelfdb_codec::TypeTag;

    fn doc() -> Document {
        let mut doc = Document::new();
        doc.set("name", "alice");
        doc.set("age", 30i64);
        doc.set("score", 1.5f64);
        doc.set("nickname", Value::Null);
        doc.set("tags", Value::from(vec!["a", "b", "c"]));
        doc
    }

    #[test]
    fn equality_is_structural() {
        assert!(field("age").eq(30i64).test(&doc()));
        assert!(!field("age").eq(30.0f64).test(&doc()));
        assert!(field("age").ne(30.0f64).test(&doc()));
        assert!(field("name").eq("alice").test(&doc()));
    }

    #[test]
    fn missing_field_reads_as_null() {
        assert!(field("missing").eq(()).test(&doc()));
        assert!(field("missing").is_none().test(&doc()));
        assert!(!field("missing").not_none().test(&doc()));
        assert!(field("nickname").is_none().test(&doc()));
        assert!(field("age").not_none().test(&doc()));
    }

    #[test]
    fn ordered_comparisons() {
        assert!(field("age").lt(31i64).test(&doc()));
        assert!(field("age").le(30i64).test(&doc()));
        assert!(field("age").gt(29i64).test(&doc()));
        assert!(field("age").ge(30i64).test(&doc()));
        assert!(!field("age").lt(30i64).test(&doc()));

        // Ints and floats compare numerically
        assert!(field("age").gt(29.5f64).test(&doc()));
        assert!(field("score").lt(2i64).test(&doc()));
    }

    #[test]
    fn incomparable_ordering_is_false() {
        assert!(!field("age").lt("string").test(&doc()));
        assert!(!field("age").ge("string").test(&doc()));
        assert!(!field("missing").lt(1i64).test(&doc()));
    }

    #[test]
    fn membership() {
        assert!(field("age").is_in([29i64, 30, 31]).test(&doc()));
        assert!(!field("age").is_in([1i64, 2]).test(&doc()));
        assert!(field("age").not_in([1i64, 2]).test(&doc()));
        assert!(field("name").is_in(["alice", "bob"]).test(&doc()));
    }

    #[test]
    fn regex_searches_anywhere() {
        assert!(field("name").matches(Regex::new("lic").unwrap()).test(&doc()));
        assert!(field("name").matches(Regex::new("^a").unwrap()).test(&doc()));
        assert!(!field("name").matches(Regex::new("^z").unwrap()).test(&doc()));
        assert!(field("name").not_matches(Regex::new("^z").unwrap()).test(&doc()));
    }

    #[test]
    fn regex_searches_string_form_of_any_value() {
        // age is the integer 30; the pattern searches its rendering
        assert!(field("age").matches(Regex::new("3").unwrap()).test(&doc()));
        assert!(field("age").matches(Regex::new("^30$").unwrap()).test(&doc()));
        assert!(!field("age").matches(Regex::new("^9").unwrap()).test(&doc()));

        assert!(field("score").matches(Regex::new("1\\.5").unwrap()).test(&doc()));
        assert!(field("nickname").matches(Regex::new("null").unwrap()).test(&doc()));
        assert!(field("tags").matches(Regex::new("b, c").unwrap()).test(&doc()));
    }

    #[test]
    fn not_matches_is_exact_negation() {
        for (name, pattern) in [("name", "lic"), ("name", "^z"), ("age", "3"), ("age", "^9")] {
            let re = Regex::new(pattern).unwrap();
            let positive = field(name).matches(re.clone()).test(&doc());
            let negative = field(name).not_matches(re).test(&doc());
            assert_ne!(positive, negative, "{name} ~ {pattern}");
        }
    }

    #[test]
    fn string_operators_are_string_only() {
        assert!(field("name").starts_with("al").test(&doc()));
        assert!(field("name").ends_with("ce").test(&doc()));
        assert!(field("name").contains("lic").test(&doc()));
        assert!(field("name").not_contains("xyz").test(&doc()));

        assert!(!field("age").starts_with("3").test(&doc()));
        assert!(!field("age").ends_with("0").test(&doc()));
        assert!(!field("age").contains("3").test(&doc()));
        assert!(!field("age").not_contains("3").test(&doc()));
    }

    #[test]
    fn between_bounds_are_inclusive() {
        assert!(field("age").between(30i64, 40i64).test(&doc()));
        assert!(field("age").between(20i64, 30i64).test(&doc()));
        assert!(!field("age").between(31i64, 40i64).test(&doc()));

        // not_between is the exact negation
        assert!(!field("age").not_between(30i64, 40i64).test(&doc()));
        assert!(field("age").not_between(31i64, 40i64).test(&doc()));
        // Incomparable values fall outside every range
        assert!(field("name").not_between(1i64, 10i64).test(&doc()));
    }

    #[test]
    fn type_tests() {
        assert!(field("age").is_type(TypeTag::Int).test(&doc()));
        assert!(field("score").is_type(TypeTag::Float).test(&doc()));
        assert!(field("missing").is_type(TypeTag::Null).test(&doc()));
        assert!(!field("age").is_type(TypeTag::Str).test(&doc()));
    }

    #[test]
    fn length_tests() {
        assert!(field("name").len_eq(5).test(&doc()));
        assert!(field("tags").len_eq(3).test(&doc()));
        assert!(field("tags").len_gt(2).test(&doc()));
        assert!(field("tags").len_lt(4).test(&doc()));

        // Ints and nulls have no length
        assert!(!field("age").len_eq(2).test(&doc()));
        assert!(!field("missing").len_lt(100).test(&doc()));
    }

    #[test]
    fn boolean_composition() {
        let both = field("age").eq(30i64).and(field("name").eq("alice"));
        assert!(both.test(&doc()));

        let one_wrong = field("age").eq(30i64).and(field("name").eq("bob"));
        assert!(!one_wrong.test(&doc()));

        let either = field("age").eq(99i64).or(field("name").eq("alice"));
        assert!(either.test(&doc()));

        let neither = field("age").eq(99i64).or(field("name").eq("bob"));
        assert!(!neither.test(&doc()));

        let nested = field("age")
            .ge(18i64)
            .and(field("name").starts_with("a").or(field("name").starts_with("b")));
        assert!(nested.test(&doc()));
    }
}
