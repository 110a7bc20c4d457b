//! Whole-query aggregation of per-field ranges (spec §4.4).
//!
//! `FieldRangeSet` walks a query document's top-level fields (skipping
//! `$where`/`$or`/`$nor`, which aren't expressible as per-field ranges),
//! builds one `FieldRange` per constrained field via intersection, and
//! exposes the query-shape derivatives (`special`, `simplified_query`,
//! `pattern`, `index_bounds`) the planner needs.

use crate::error::{codes, DocIdxError, ErrorOrigin, Result};
use crate::field_range::FieldRange;
use crate::index_bounds::{IndexBoundRange, IndexBoundsCompiler};
use crate::model::IndexModel;
use crate::ops::{classify_clause, is_elem_match_wrapper, is_not_wrapper, OpTag};
use crate::pattern::QueryPattern;
use crate::value::{Document, Value};
use std::collections::BTreeMap;

/// Top-level query keys this crate doesn't turn into per-field ranges.
/// `$or`/`$nor` are handled one layer up by `FieldRangeOrSet`; `$where`
/// is an opaque predicate with no indexable shape at all.
const SKIPPED_TOP_LEVEL_KEYS: &[&str] = &["$where", "$or", "$nor"];

///
/// FieldRangeSet
///
/// The per-field ranges implied by one query document (or one `$or` arm).
///
#[derive(Clone, Debug)]
pub struct FieldRangeSet {
    pub ns: String,
    pub query: Document,
    pub ranges: BTreeMap<String, FieldRange>,
}

impl FieldRangeSet {
    pub fn new(ns: impl Into<String>, query: Document, optimize: bool) -> Result<Self> {
        let mut set = Self { ns: ns.into(), query: query.clone(), ranges: BTreeMap::new() };
        for (name, value) in &query {
            if SKIPPED_TOP_LEVEL_KEYS.contains(&name.as_str()) {
                continue;
            }
            set.process_query_field(name, value, optimize)?;
        }
        Ok(set)
    }

    fn intersect_field(&mut self, name: &str, range: FieldRange) {
        self.ranges
            .entry(name.to_string())
            .and_modify(|existing| *existing &= &range)
            .or_insert(range);
    }

    fn process_query_field(&mut self, name: &str, value: &Value, optimize: bool) -> Result<()> {
        let equality = classify_clause(value) == OpTag::Equality && !is_not_wrapper(value);

        if equality || crate::ops::has_regex_key(value) {
            let range = FieldRange::from_literal(value, false, optimize)?;
            self.intersect_field(name, range);
        }

        if !equality {
            let doc = value.as_object().ok_or_else(|| {
                DocIdxError::invariant(
                    ErrorOrigin::FieldRangeSet,
                    format!("field '{name}' classified as operator document but isn't one"),
                )
            })?;
            for (key, sub_value) in doc {
                if key == "$not" {
                    self.process_not(name, sub_value, optimize)?;
                } else {
                    self.process_op_element(name, key, sub_value, false, optimize)?;
                }
            }
        }
        Ok(())
    }

    fn process_not(&mut self, name: &str, sub_value: &Value, optimize: bool) -> Result<()> {
        match sub_value {
            Value::Object(inner) => {
                for (inner_key, inner_value) in inner {
                    if OpTag::from_key(inner_key) == OpTag::Equality {
                        return Err(DocIdxError::user(
                            codes::NOT_INVALID_OBJECT,
                            ErrorOrigin::FieldRangeSet,
                            format!("$not on '{name}' cannot contain an equality key ('{inner_key}')"),
                        ));
                    }
                    self.process_op_element(name, inner_key, inner_value, true, optimize)?;
                }
                Ok(())
            }
            Value::Regex(_) => self.process_op_element(name, "$regex", sub_value, true, optimize),
            _ => Err(DocIdxError::user(
                codes::NOT_INVALID_TYPE,
                ErrorOrigin::FieldRangeSet,
                format!("$not on '{name}' requires an object or regex operand"),
            )),
        }
    }

    fn process_op_element(&mut self, name: &str, op_key: &str, op_value: &Value, is_not: bool, optimize: bool) -> Result<()> {
        if op_key == "$all" {
            if let Some(items) = op_value.as_array() {
                if let Some(first) = items.first() {
                    if is_elem_match_wrapper(first) {
                        if let Some(inner) = first.as_object().and_then(|doc| doc.get("$elemMatch")) {
                            return self.process_elem_match(name, inner, is_not, optimize);
                        }
                    }
                }
            }
        }
        if op_key == "$elemMatch" {
            return self.process_elem_match(name, op_value, is_not, optimize);
        }
        let range = FieldRange::from_operator(op_key, op_value, is_not, optimize)?;
        self.intersect_field(name, range);
        Ok(())
    }

    /// `$elemMatch`: each inner predicate applies to `field.inner` as if
    /// it were a top-level clause on that dotted path.
    fn process_elem_match(&mut self, name: &str, inner_value: &Value, is_not: bool, optimize: bool) -> Result<()> {
        let inner = inner_value.as_object().ok_or_else(|| {
            DocIdxError::user(
                codes::NOT_INVALID_TYPE,
                ErrorOrigin::FieldRangeSet,
                format!("$elemMatch on '{name}' requires an object operand"),
            )
        })?;

        for (inner_name, predicate) in inner {
            let full_name = format!("{name}.{inner_name}");
            let equality = classify_clause(predicate) == OpTag::Equality && !is_not_wrapper(predicate);
            if equality || crate::ops::has_regex_key(predicate) {
                let range = FieldRange::from_literal(predicate, is_not, optimize)?;
                self.intersect_field(&full_name, range);
            }
            if !equality {
                if let Some(doc) = predicate.as_object() {
                    for (key, sub_value) in doc {
                        if key == "$not" {
                            self.process_not(&full_name, sub_value, optimize)?;
                        } else {
                            self.process_op_element(&full_name, key, sub_value, is_not, optimize)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// The single special (non-btree) access-method tag carried by this
    /// query's ranges, if any. More than one field with a distinct
    /// special tag is rejected — a query can't be routed through two
    /// incompatible index types at once.
    pub fn special(&self) -> Result<Option<&str>> {
        let mut found: Option<&str> = None;
        for range in self.ranges.values() {
            if let Some(tag) = &range.special {
                if let Some(existing) = found {
                    if existing != tag {
                        return Err(DocIdxError::user(
                            codes::TWO_SPECIAL_FIELDS,
                            ErrorOrigin::FieldRangeSet,
                            "query has ranges for two different special index types",
                        ));
                    }
                }
                found = Some(tag.as_str());
            }
        }
        Ok(found)
    }

    /// SUPPLEMENT: a simplified re-expression of the query with each
    /// field's range folded down to the tightest equivalent clause —
    /// used for plan-cache normalization. When `expand_in` is true, a
    /// field whose range is nothing but a run of equality intervals
    /// (e.g. from `$in`) is re-expressed as `{$in: [...]}`.
    #[must_use]
    pub fn simplified_query(&self, expand_in: bool) -> Document {
        let mut doc = Document::new();
        for (name, range) in &self.ranges {
            if range.is_empty() {
                continue;
            }
            if expand_in && range.intervals.len() > 1 && range.intervals.iter().all(|i| i.is_equality()) {
                let values = range.intervals.iter().map(|i| i.lower.value.clone()).collect();
                let mut in_doc = Document::new();
                in_doc.push("$in", Value::Array(values));
                doc.push(name.clone(), Value::Object(in_doc));
            } else if range.is_equality() {
                doc.push(name.clone(), range.intervals[0].lower.value.clone());
            } else if range.is_nontrivial() {
                let mut bounds = Document::new();
                if let Some(lower) = range.min() {
                    if !matches!(lower.value, Value::MinKey) {
                        let key = if lower.inclusive { "$gte" } else { "$gt" };
                        bounds.push(key, lower.value.clone());
                    }
                }
                if let Some(upper) = range.max() {
                    if !matches!(upper.value, Value::MaxKey) {
                        let key = if upper.inclusive { "$lte" } else { "$lt" };
                        bounds.push(key, upper.value.clone());
                    }
                }
                if bounds.first().is_some() {
                    doc.push(name.clone(), Value::Object(bounds));
                }
            }
        }
        doc
    }

    /// The plan-cache fingerprint for this query under the given sort.
    #[must_use]
    pub fn pattern(&self, sort: Document) -> QueryPattern {
        QueryPattern::new(&self.ranges, sort)
    }

    /// Compile this query's ranges into index scan bounds for `index`.
    pub fn index_bounds(&self, index: &IndexModel, direction: i8) -> Result<Vec<IndexBoundRange>> {
        IndexBoundsCompiler::new().compile(self, index, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(pairs: Vec<(&str, Value)>) -> Document {
        Document::from_pairs(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn plain_equality_field_becomes_equality_range() {
        let query = doc(vec![("a", num(5.0))]);
        let set = FieldRangeSet::new("ns", query, true).unwrap();
        assert!(set.ranges["a"].is_equality());
    }

    #[test]
    fn gt_and_lt_on_same_field_intersect() {
        let mut ops = Document::new();
        ops.push("$gt", num(1.0));
        ops.push("$lt", num(10.0));
        let query = doc(vec![("a", Value::Object(ops))]);
        let set = FieldRangeSet::new("ns", query, true).unwrap();
        let range = &set.ranges["a"];
        assert_eq!(range.intervals.len(), 1);
        assert_eq!(range.min().unwrap().value, num(1.0));
        assert_eq!(range.max().unwrap().value, num(10.0));
    }

    #[test]
    fn not_with_equality_inner_key_is_rejected() {
        let mut not_doc = Document::new();
        not_doc.push("$eq", num(5.0));
        let mut ops = Document::new();
        ops.push("$not", Value::Object(not_doc));
        let query = doc(vec![("a", Value::Object(ops))]);
        let err = FieldRangeSet::new("ns", query, true).unwrap_err();
        assert_eq!(err.code, codes::NOT_INVALID_OBJECT);
    }

    #[test]
    fn not_gte_rewrites_to_lt() {
        let mut not_doc = Document::new();
        not_doc.push("$gte", num(5.0));
        let mut ops = Document::new();
        ops.push("$not", Value::Object(not_doc));
        let query = doc(vec![("a", Value::Object(ops))]);
        let set = FieldRangeSet::new("ns", query, true).unwrap();
        let range = &set.ranges["a"];
        assert_eq!(range.max().unwrap().value, num(5.0));
        assert!(!range.max().unwrap().inclusive);
    }

    #[test]
    fn elem_match_scopes_to_dotted_path() {
        let mut inner = Document::new();
        inner.push("x", num(1.0));
        let mut elem_match = Document::new();
        elem_match.push("$elemMatch", Value::Object(inner));
        let query = doc(vec![("items", Value::Object(elem_match))]);
        let set = FieldRangeSet::new("ns", query, true).unwrap();
        assert!(set.ranges.contains_key("items.x"));
        assert!(set.ranges["items.x"].is_equality());
    }

    #[test]
    fn near_and_within_share_the_same_special_tag() {
        let mut near_doc = Document::new();
        near_doc.push("$near", Value::Array(vec![num(1.0), num(2.0)]));
        let mut within_doc = Document::new();
        within_doc.push("$within", Value::Array(vec![num(1.0), num(2.0)]));
        let query = doc(vec![("a", Value::Object(near_doc)), ("b", Value::Object(within_doc))]);
        let set = FieldRangeSet::new("ns", query, true).unwrap();
        // Both map to the same "2d" special tag, so this does not error.
        assert!(set.special().unwrap().is_some());
    }

    #[test]
    fn simplified_query_folds_bounds_into_gte_lte() {
        let mut ops = Document::new();
        ops.push("$gte", num(1.0));
        ops.push("$lte", num(10.0));
        let query = doc(vec![("a", Value::Object(ops))]);
        let set = FieldRangeSet::new("ns", query, true).unwrap();
        let simplified = set.simplified_query(false);
        let Some(Value::Object(bounds)) = simplified.get("a") else {
            panic!("expected bounds object");
        };
        assert_eq!(bounds.get("$gte"), Some(&num(1.0)));
        assert_eq!(bounds.get("$lte"), Some(&num(10.0)));
    }

    #[test]
    fn simplified_query_expands_in_when_requested() {
        let mut in_doc = Document::new();
        in_doc.push("$in", Value::Array(vec![num(2.0), num(1.0)]));
        let query = doc(vec![("a", Value::Object(in_doc))]);
        let set = FieldRangeSet::new("ns", query, true).unwrap();
        let simplified = set.simplified_query(true);
        let Some(Value::Object(in_obj)) = simplified.get("a") else {
            panic!("expected $in object");
        };
        assert_eq!(in_obj.get("$in"), Some(&Value::Array(vec![num(1.0), num(2.0)])));
    }
}
