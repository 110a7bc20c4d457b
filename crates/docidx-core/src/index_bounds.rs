//! Compound-index bound compilation (spec §4.6).
//!
//! Walks a compound index's key pattern against a `FieldRangeSet`,
//! producing the Cartesian-product set of `(start, end)` key-range pairs
//! a scan over that index must visit. Fields are consumed left to right:
//! a single-equality field just narrows a single running prefix; an
//! enumeration field (`$in`/`$all`/array-equality — every interval is a
//! single-point equality) fans out the running combos but doesn't end
//! the prefix, so later enumeration fields keep Cartesian-expanding too;
//! the first field with a genuine (non-enumeration) range is "the
//! inequality field" — it fans out once, and every field after it is
//! filled with its own min/max rather than expanded further, since a
//! btree scan can only walk one dimension of true range variation per
//! pass.

use crate::bound::{Bound, Interval};
use crate::error::{codes, DocIdxError, ErrorOrigin, Result};
use crate::field_range::FieldRange;
use crate::field_range_set::FieldRangeSet;
use crate::model::IndexModel;
use crate::value::{Document, Value};

/// Default Cartesian-product fan-out cap. A compound index with several
/// multi-valued `$in`/`$or`-like fields can blow this up combinatorially;
/// past this many combinations the planner should fall back to a full
/// scan rather than materialize the product.
pub const DEFAULT_FANOUT_LIMIT: usize = 1_000_000;

/// One compiled scan range: a start/end key pair plus whether each end
/// is inclusive. Equality-prefix fields are always inclusive on both
/// ends (there's only one value to match); inclusivity only varies on
/// the inequality field's contribution.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexBoundRange {
    pub start: Document,
    pub end: Document,
    pub start_inclusive: bool,
    pub end_inclusive: bool,
}

/// Per-field accumulator used while building the Cartesian product.
#[derive(Clone, Debug, Default)]
struct Combo {
    lower: Vec<Value>,
    lower_inclusive: bool,
    upper: Vec<Value>,
    upper_inclusive: bool,
}

///
/// IndexBoundsCompiler
///
/// Stateless compiler from `(FieldRangeSet, IndexModel, direction)` to
/// scan ranges. `with_fanout_limit` overrides the default cap, mainly for
/// tests that want to exercise the cap without a million-entry `$in`.
///
#[derive(Clone, Copy, Debug)]
pub struct IndexBoundsCompiler {
    fanout_limit: usize,
}

impl Default for IndexBoundsCompiler {
    fn default() -> Self {
        Self { fanout_limit: DEFAULT_FANOUT_LIMIT }
    }
}

impl IndexBoundsCompiler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_fanout_limit(mut self, limit: usize) -> Self {
        self.fanout_limit = limit;
        self
    }

    /// Compile scan ranges for `index` given `ranges`, scanning in
    /// `direction` (`1` forward, `-1` reverse).
    pub fn compile(&self, ranges: &FieldRangeSet, index: &IndexModel, direction: i8) -> Result<Vec<IndexBoundRange>> {
        let mut ineq_seen = false;
        let mut combos = vec![Combo { lower_inclusive: true, upper_inclusive: true, ..Combo::default() }];

        for field in &index.fields {
            let range = ranges.ranges.get(field.name).cloned().unwrap_or_else(FieldRange::universal);
            let effective_dir = direction * field.direction.signum();

            if !ineq_seen && range.is_equality() {
                let value = range.intervals[0].lower.value.clone();
                for combo in &mut combos {
                    combo.lower.push(value.clone());
                    combo.upper.push(value.clone());
                }
                continue;
            }

            if !ineq_seen {
                // An enumeration (`$in`/`$all`/array-equality — all
                // intervals are single-point equalities) still fans out
                // here, but doesn't consume the "one true inequality
                // field" slot: every subsequent enumeration field also
                // gets to Cartesian-expand (spec §4.6 scenario 7). Only a
                // genuine range narrows the scan to one dimension.
                let is_enumeration = range.intervals.iter().all(Interval::is_equality);
                if !is_enumeration {
                    ineq_seen = true;
                }

                let mut intervals = if range.is_empty() {
                    vec![]
                } else {
                    range.intervals.clone()
                };
                if effective_dir < 0 {
                    intervals.reverse();
                }

                let fanned = combos.len().saturating_mul(intervals.len());
                if fanned > self.fanout_limit {
                    return Err(self.fanout_error(direction, fanned));
                }

                let mut next = Vec::with_capacity(fanned);
                for combo in &combos {
                    for interval in &intervals {
                        let mut expanded = combo.clone();
                        expanded.lower.push(interval.lower.value.clone());
                        expanded.upper.push(interval.upper.value.clone());
                        expanded.lower_inclusive = combo.lower_inclusive && interval.lower.inclusive;
                        expanded.upper_inclusive = combo.upper_inclusive && interval.upper.inclusive;
                        next.push(expanded);
                    }
                }
                combos = next;
                continue;
            }

            // Suffix field after the inequality field: fill with this
            // field's own min/max rather than expanding further.
            let lower = range.min().cloned().unwrap_or_else(|| Bound::inclusive(Value::MinKey));
            let upper = range.max().cloned().unwrap_or_else(|| Bound::inclusive(Value::MaxKey));
            for combo in &mut combos {
                combo.lower.push(lower.value.clone());
                combo.upper.push(upper.value.clone());
                combo.lower_inclusive &= lower.inclusive;
                combo.upper_inclusive &= upper.inclusive;
            }
        }

        if combos.len() > self.fanout_limit {
            return Err(self.fanout_error(direction, combos.len()));
        }

        Ok(combos
            .into_iter()
            .map(|combo| {
                let mut start = Document::new();
                let mut end = Document::new();
                for (idx, field) in index.fields.iter().enumerate() {
                    start.push(field.name, combo.lower[idx].clone());
                    end.push(field.name, combo.upper[idx].clone());
                }
                IndexBoundRange {
                    start,
                    end,
                    start_inclusive: combo.lower_inclusive,
                    end_inclusive: combo.upper_inclusive,
                }
            })
            .collect())
    }

    fn fanout_error(&self, direction: i8, attempted: usize) -> DocIdxError {
        log::warn!("index bounds fan-out {attempted} exceeds limit {}", self.fanout_limit);
        let code = if direction < 0 { codes::FANOUT_LIMIT_REVERSE } else { codes::FANOUT_LIMIT_FORWARD };
        DocIdxError::user(
            code,
            ErrorOrigin::IndexBounds,
            format!("index bounds would expand to {attempted} ranges, exceeding the {} limit", self.fanout_limit),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IndexField, IndexModel};
    use crate::value::Document as Doc;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn equality_prefix_then_range_expands_only_the_range_field() {
        let mut query = Doc::new();
        query.push("a", num(1.0));
        let mut b_ops = Doc::new();
        b_ops.push("$gt", num(5.0));
        b_ops.push("$lt", num(10.0));
        query.push("b", Value::Object(b_ops));

        let ranges = FieldRangeSet::new("ns", query, true).unwrap();
        let index = IndexModel::new("a_b", vec![IndexField::new("a", 1), IndexField::new("b", 1)]);
        let compiled = IndexBoundsCompiler::new().compile(&ranges, &index, 1).unwrap();

        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].start.get("a"), Some(&num(1.0)));
        assert_eq!(compiled[0].start.get("b"), Some(&num(5.0)));
        assert_eq!(compiled[0].end.get("b"), Some(&num(10.0)));
        assert!(!compiled[0].start_inclusive || !compiled[0].end_inclusive);
    }

    #[test]
    fn in_on_leading_field_fans_out() {
        let mut query = Doc::new();
        let mut in_doc = Doc::new();
        in_doc.push("$in", Value::Array(vec![num(1.0), num(2.0), num(3.0)]));
        query.push("a", Value::Object(in_doc));

        let ranges = FieldRangeSet::new("ns", query, true).unwrap();
        let index = IndexModel::new("a", vec![IndexField::new("a", 1)]);
        let compiled = IndexBoundsCompiler::new().compile(&ranges, &index, 1).unwrap();
        assert_eq!(compiled.len(), 3);
    }

    #[test]
    fn two_in_fields_fan_out_independently() {
        // spec.md §8 scenario 7: {a:{$in:[1,2]}, b:{$in:[10,20]}}
        // against key pattern {a:1,b:1} must produce the full 2x2
        // Cartesian product, not collapse the second field to a
        // single suffix span.
        let mut query = Doc::new();
        let mut a_in = Doc::new();
        a_in.push("$in", Value::Array(vec![num(1.0), num(2.0)]));
        query.push("a", Value::Object(a_in));
        let mut b_in = Doc::new();
        b_in.push("$in", Value::Array(vec![num(10.0), num(20.0)]));
        query.push("b", Value::Object(b_in));

        let ranges = FieldRangeSet::new("ns", query, true).unwrap();
        let index = IndexModel::new("a_b", vec![IndexField::new("a", 1), IndexField::new("b", 1)]);
        let compiled = IndexBoundsCompiler::new().compile(&ranges, &index, 1).unwrap();

        assert_eq!(compiled.len(), 4);
        let pairs: Vec<(Value, Value)> =
            compiled.iter().map(|c| (c.start.get("a").unwrap().clone(), c.start.get("b").unwrap().clone())).collect();
        for a in [num(1.0), num(2.0)] {
            for b in [num(10.0), num(20.0)] {
                assert!(pairs.contains(&(a.clone(), b.clone())));
            }
        }
    }

    #[test]
    fn fanout_cap_rejects_oversized_product() {
        let mut query = Doc::new();
        let mut in_doc = Doc::new();
        in_doc.push("$in", Value::Array((0..10).map(|n| num(n as f64)).collect()));
        query.push("a", Value::Object(in_doc));

        let ranges = FieldRangeSet::new("ns", query, true).unwrap();
        let index = IndexModel::new("a", vec![IndexField::new("a", 1)]);
        let err = IndexBoundsCompiler::new().with_fanout_limit(5).compile(&ranges, &index, 1).unwrap_err();
        assert_eq!(err.code, codes::FANOUT_LIMIT_FORWARD);
    }

    #[test]
    fn suffix_field_after_inequality_is_not_expanded() {
        let mut query = Doc::new();
        let mut a_ops = Doc::new();
        a_ops.push("$gt", num(1.0));
        query.push("a", Value::Object(a_ops));
        let mut b_in = Doc::new();
        b_in.push("$in", Value::Array(vec![num(1.0), num(2.0)]));
        query.push("b", Value::Object(b_in));

        let ranges = FieldRangeSet::new("ns", query, true).unwrap();
        let index = IndexModel::new("a_b", vec![IndexField::new("a", 1), IndexField::new("b", 1)]);
        let compiled = IndexBoundsCompiler::new().compile(&ranges, &index, 1).unwrap();
        assert_eq!(compiled.len(), 1);
    }
}
