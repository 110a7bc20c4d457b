//! Plan-cache fingerprint (spec §4.5): a coarse shape summary of a query
//! that is stable across queries whose literal values differ but whose
//! index usage would be identical.

use crate::field_range::FieldRange;
use crate::value::{Document, Value};
use std::collections::BTreeMap;

///
/// FieldKind
///
/// How a field participates in the query shape, independent of the
/// actual bound values.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Equality,
    LowerBound,
    UpperBound,
    UpperAndLowerBound,
}

impl FieldKind {
    fn from_range(range: &FieldRange) -> Option<Self> {
        if range.is_equality() {
            return Some(Self::Equality);
        }
        if !range.is_nontrivial() {
            return None;
        }
        let has_lower = range.min().is_some_and(|b| !matches!(b.value, Value::MinKey));
        let has_upper = range.max().is_some_and(|b| !matches!(b.value, Value::MaxKey));
        match (has_lower, has_upper) {
            (true, true) => Some(Self::UpperAndLowerBound),
            (true, false) => Some(Self::LowerBound),
            (false, true) => Some(Self::UpperBound),
            (false, false) => None,
        }
    }
}

///
/// QueryPattern
///
/// Maps each constrained field to its `FieldKind`, plus the sort
/// specification verbatim — two queries with the same pattern are
/// eligible to share a cached plan.
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryPattern {
    pub field_kind: BTreeMap<String, FieldKind>,
    pub sort: Document,
}

impl QueryPattern {
    #[must_use]
    pub fn new(ranges: &BTreeMap<String, FieldRange>, sort: Document) -> Self {
        let field_kind = ranges
            .iter()
            .filter_map(|(name, range)| FieldKind::from_range(range).map(|kind| (name.clone(), kind)))
            .collect();
        Self { field_kind, sort }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_range_set::FieldRangeSet;
    use crate::value::Document as Doc;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn equality_field_classified_as_equality() {
        let mut query = Doc::new();
        query.push("a", num(1.0));
        let set = FieldRangeSet::new("ns", query, true).unwrap();
        let pattern = set.pattern(Doc::new());
        assert_eq!(pattern.field_kind["a"], FieldKind::Equality);
    }

    #[test]
    fn one_sided_range_classified_by_bound_side() {
        let mut ops = Doc::new();
        ops.push("$gt", num(1.0));
        let mut query = Doc::new();
        query.push("a", Value::Object(ops));
        let set = FieldRangeSet::new("ns", query, true).unwrap();
        let pattern = set.pattern(Doc::new());
        assert_eq!(pattern.field_kind["a"], FieldKind::LowerBound);
    }

    #[test]
    fn unconstrained_field_is_absent_from_pattern() {
        // $ne carries no tightenable bound, so the field stays fully
        // unconstrained and shouldn't appear in the pattern at all.
        let mut ops = Doc::new();
        ops.push("$ne", num(1.0));
        let mut query = Doc::new();
        query.push("a", Value::Object(ops));
        let set = FieldRangeSet::new("ns", query, true).unwrap();
        let pattern = set.pattern(Doc::new());
        assert!(!pattern.field_kind.contains_key("a"));
    }
}
