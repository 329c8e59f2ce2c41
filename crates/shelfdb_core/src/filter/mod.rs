//! Filter expressions for `find`.
//!
//! A filter is a small AST built from chained calls on a field-bound
//! builder and evaluated per document:
//!
//! ```
//! use shelfdb_core::filter::field;
//!
//! let expr = field("age").ge(18i64).and(field("name").starts_with("a"));
//! ```
//!
//! There is no `not` node; every operator has a dedicated negative variant
//! (`ne`, `not_in`, `not_between`, ...).

mod eval;

use regex::Regex;
use shelfdb_codec::{TypeTag, Value};

/// Starts a filter expression on a field.
#[must_use]
pub fn field(name: impl Into<String>) -> FieldSelector {
    FieldSelector { name: name.into() }
}

/// A field name awaiting an operator.
#[derive(Debug, Clone)]
pub struct FieldSelector {
    name: String,
}

impl FieldSelector {
    fn compare(self, op: CompareOp) -> Filter {
        Filter::Compare {
            field: self.name,
            op,
        }
    }

    /// Field value equals the operand (structural equality).
    pub fn eq(self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Eq(value.into()))
    }

    /// Field value differs from the operand.
    pub fn ne(self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Ne(value.into()))
    }

    /// Field value orders below the operand.
    pub fn lt(self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Lt(value.into()))
    }

    /// Field value orders at or below the operand.
    pub fn le(self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Le(value.into()))
    }

    /// Field value orders above the operand.
    pub fn gt(self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Gt(value.into()))
    }

    /// Field value orders at or above the operand.
    pub fn ge(self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Ge(value.into()))
    }

    /// Field value is a member of the given set.
    pub fn is_in<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Filter {
        self.compare(CompareOp::In(values.into_iter().map(Into::into).collect()))
    }

    /// Field value is not a member of the given set.
    pub fn not_in<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Filter {
        self.compare(CompareOp::NotIn(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// The pattern matches somewhere in the field value's string form.
    ///
    /// Non-string values are searched through their rendered text, so a
    /// pattern like `3` matches the integer `30`.
    pub fn matches(self, pattern: Regex) -> Filter {
        self.compare(CompareOp::Matches(pattern))
    }

    /// The pattern matches nowhere in the field value's string form.
    pub fn not_matches(self, pattern: Regex) -> Filter {
        self.compare(CompareOp::NotMatches(pattern))
    }

    /// Field value is null (a missing field reads as null).
    pub fn is_none(self) -> Filter {
        self.compare(CompareOp::IsNone)
    }

    /// Field value is anything but null.
    pub fn not_none(self) -> Filter {
        self.compare(CompareOp::NotNone)
    }

    /// Field value is a string starting with the prefix.
    pub fn starts_with(self, prefix: impl Into<String>) -> Filter {
        self.compare(CompareOp::StartsWith(prefix.into()))
    }

    /// Field value is a string ending with the suffix.
    pub fn ends_with(self, suffix: impl Into<String>) -> Filter {
        self.compare(CompareOp::EndsWith(suffix.into()))
    }

    /// Field value is a string containing the needle.
    pub fn contains(self, needle: impl Into<String>) -> Filter {
        self.compare(CompareOp::Contains(needle.into()))
    }

    /// Field value is a string not containing the needle.
    pub fn not_contains(self, needle: impl Into<String>) -> Filter {
        self.compare(CompareOp::NotContains(needle.into()))
    }

    /// Field value lies in `low..=high` (inclusive bounds).
    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Between(low.into(), high.into()))
    }

    /// Field value lies outside `low..=high`.
    pub fn not_between(self, low: impl Into<Value>, high: impl Into<Value>) -> Filter {
        self.compare(CompareOp::NotBetween(low.into(), high.into()))
    }

    /// Field value's dynamic type matches the tag.
    pub fn is_type(self, tag: TypeTag) -> Filter {
        self.compare(CompareOp::IsType(tag))
    }

    /// Field value's length equals the operand.
    pub fn len_eq(self, len: usize) -> Filter {
        self.compare(CompareOp::LenEq(len))
    }

    /// Field value's length exceeds the operand.
    pub fn len_gt(self, len: usize) -> Filter {
        self.compare(CompareOp::LenGt(len))
    }

    /// Field value's length is below the operand.
    pub fn len_lt(self, len: usize) -> Filter {
        self.compare(CompareOp::LenLt(len))
    }
}

/// A leaf comparison against one field's value.
#[derive(Debug, Clone)]
pub enum CompareOp {
    /// Structural equality.
    Eq(Value),
    /// Negated structural equality.
    Ne(Value),
    /// Ordered less-than.
    Lt(Value),
    /// Ordered less-or-equal.
    Le(Value),
    /// Ordered greater-than.
    Gt(Value),
    /// Ordered greater-or-equal.
    Ge(Value),
    /// Set membership.
    In(Vec<Value>),
    /// Negated set membership.
    NotIn(Vec<Value>),
    /// Regex search over the value's string form.
    Matches(Regex),
    /// Negated regex search over the value's string form.
    NotMatches(Regex),
    /// Value is the null marker.
    IsNone,
    /// Value is not the null marker.
    NotNone,
    /// String prefix test.
    StartsWith(String),
    /// String suffix test.
    EndsWith(String),
    /// String substring test.
    Contains(String),
    /// Negated string substring test.
    NotContains(String),
    /// Inclusive range test.
    Between(Value, Value),
    /// Negated inclusive range test.
    NotBetween(Value, Value),
    /// Dynamic type test.
    IsType(TypeTag),
    /// Length equality.
    LenEq(usize),
    /// Length greater-than.
    LenGt(usize),
    /// Length less-than.
    LenLt(usize),
}

/// A filter expression tree.
#[derive(Debug, Clone)]
pub enum Filter {
    /// A leaf predicate on one field.
    Compare {
        /// Field name the predicate reads.
        field: String,
        /// The comparison to apply.
        op: CompareOp,
    },
    /// Both sides must match; the right side is skipped when the left fails.
    And(Box<Filter>, Box<Filter>),
    /// Either side may match; the right side is skipped when the left holds.
    Or(Box<Filter>, Box<Filter>),
}

impl Filter {
    /// Combines two filters so both must match.
    #[must_use]
    pub fn and(self, other: Filter) -> Filter {
        Filter::And(Box::new(self), Box::new(other))
    }

    /// Combines two filters so either may match.
    #[must_use]
    pub fn or(self, other: Filter) -> Filter {
        Filter::Or(Box::new(self), Box::new(other))
    }
}
