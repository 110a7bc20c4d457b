//! Per-field interval algebra (spec §4.2, §4.3).
//!
//! `FieldRange` is the unit of index-bound reasoning: the set of values a
//! single field is constrained to by one or more query clauses, expressed
//! as a sorted, disjoint list of `Interval`s plus an optional "special"
//! access-method tag (e.g. `"2d"` for `$near`/`$within`).

use crate::bound::{tightest_lower, tightest_upper, Bound, Interval};
use crate::error::{codes, DocIdxError, ErrorOrigin, Result};
use crate::ops::{has_regex_key, is_elem_match_wrapper, OpTag};
use crate::regex_prefix::{simple_regex, simple_regex_end};
use crate::value::{max_for_type, min_for_type, Regex as ValueRegex, TypeTag, Value};
use std::cmp::Ordering;
use std::ops::{BitAndAssign, BitOrAssign, SubAssign};

///
/// FieldRange
///
/// A sorted, pairwise-disjoint list of closed/half-open intervals a field
/// is constrained to, plus a carried-through "special" access-method tag.
/// `empty()` (no intervals) means the field can never match; the
/// universal range (single `[MinKey, MaxKey]` interval) means no
/// constraint at all.
///
#[derive(Clone, Debug, PartialEq)]
pub struct FieldRange {
    pub intervals: Vec<Interval>,
    pub special: Option<String>,
}

impl FieldRange {
    /// The unconstrained range: every value, `MinKey` through `MaxKey`.
    #[must_use]
    pub fn universal() -> Self {
        Self {
            intervals: vec![Interval::new(Bound::inclusive(Value::MinKey), Bound::inclusive(Value::MaxKey))],
            special: None,
        }
    }

    /// The range matching nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self { intervals: Vec::new(), special: None }
    }

    #[must_use]
    fn from_single(interval: Interval) -> Self {
        Self { intervals: vec![interval], special: None }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Whether this range is a single exact value.
    #[must_use]
    pub fn is_equality(&self) -> bool {
        self.intervals.len() == 1 && self.intervals[0].is_equality()
    }

    /// Whether this range excludes at least one value (i.e. isn't the
    /// fully unconstrained universal range).
    #[must_use]
    pub fn is_nontrivial(&self) -> bool {
        !(self.intervals.len() == 1
            && matches!(self.intervals[0].lower.value, Value::MinKey)
            && self.intervals[0].lower.inclusive
            && matches!(self.intervals[0].upper.value, Value::MaxKey)
            && self.intervals[0].upper.inclusive)
    }

    /// Tightest known lower bound across all intervals (the first one,
    /// since intervals are kept sorted ascending).
    #[must_use]
    pub fn min(&self) -> Option<&Bound> {
        self.intervals.first().map(|interval| &interval.lower)
    }

    /// Tightest known upper bound across all intervals (the last one).
    #[must_use]
    pub fn max(&self) -> Option<&Bound> {
        self.intervals.last().map(|interval| &interval.upper)
    }

    fn finish(&mut self, other: &Self) {
        if self.special.is_none() {
            self.special = other.special.clone();
        }
    }

    // ---- construction ----------------------------------------------

    /// Build a `FieldRange` for a field's whole query value, treated as a
    /// literal (non-operator) clause: plain equality, array-equality
    /// (spec §4.2 case 2), or a regex value/`{$regex, $options}` object
    /// (case 3).
    pub fn from_literal(value: &Value, is_not: bool, optimize: bool) -> Result<Self> {
        if let Value::Array(items) = value {
            return Ok(Self::from_array_equality(value, items));
        }
        if matches!(value, Value::Regex(_)) || has_regex_key(value) {
            return Self::from_regex_like(value, is_not);
        }
        Self::from_op_tag(OpTag::Equality, value, is_not, optimize)
    }

    /// Case 2: array-equality. The array matches both as a whole value
    /// and, since array fields index each element individually, via its
    /// first element — whichever of the two sorts smaller goes first so
    /// the interval list stays in canonical order.
    fn from_array_equality(whole: &Value, items: &[Value]) -> Self {
        let mut intervals = vec![Interval::equality(whole.clone())];
        if let Some(first) = items.first() {
            if Value::canonical_cmp(first, whole) == Ordering::Less {
                intervals.insert(0, Interval::equality(first.clone()));
            } else {
                intervals.push(Interval::equality(first.clone()));
            }
        }
        Self { intervals, special: None }
    }

    /// Case 3: a regex value, or the `{$regex: ..., $options: ...}`
    /// object spelling of one.
    ///
    /// SUPPLEMENT: in addition to the `[prefix, prefix⁺)` scan range (or
    /// the full `[minForType(String), maxForType(String))` bracket when
    /// no usable prefix exists), the regex always matches itself as a
    /// literal value — a document storing the regex object verbatim in
    /// that field satisfies the query. That equality interval is pushed
    /// unconditionally. A negated regex clause is accepted but left
    /// fully unconstrained — see DESIGN.md.
    fn from_regex_like(value: &Value, is_not: bool) -> Result<Self> {
        if is_not {
            return Ok(Self::universal());
        }
        let (pattern, flags, regex_value) = match value {
            Value::Regex(re) => (re.pattern.clone(), re.flags.clone(), value.clone()),
            Value::Object(doc) => {
                let pattern = match doc.get("$regex") {
                    Some(Value::String(s)) => s.clone(),
                    _ => return Ok(Self::universal()),
                };
                let flags = match doc.get("$options") {
                    Some(Value::String(s)) => s.clone(),
                    _ => String::new(),
                };
                (
                    pattern.clone(),
                    flags.clone(),
                    Value::Regex(ValueRegex::new(pattern, flags)),
                )
            }
            _ => return Ok(Self::universal()),
        };

        let (prefix, _pure) = simple_regex(&pattern, &flags);
        let scan = if prefix.is_empty() {
            Interval::new(
                Bound::inclusive(min_for_type(TypeTag::String)),
                Bound::exclusive(max_for_type(TypeTag::String)),
            )
        } else {
            let end = simple_regex_end(&prefix);
            Interval::new(Bound::inclusive(Value::String(prefix)), Bound::exclusive(Value::String(end)))
        };

        Ok(Self { intervals: vec![scan, Interval::equality(regex_value)], special: None })
    }

    /// Build a `FieldRange` from one query operator (`$gte`, `$in`,
    /// `$all`, ...), as encountered while iterating an operator document's
    /// keys. `is_not` reflects whether this operator sat inside a `$not`.
    pub fn from_operator(op_key: &str, value: &Value, is_not: bool, optimize: bool) -> Result<Self> {
        let op = OpTag::from_key(op_key);
        if matches!(op, OpTag::In) && !is_not && !matches!(value, Value::Regex(_)) {
            return Self::from_in(value);
        }
        Self::from_op_tag(op, value, is_not, optimize)
    }

    /// Case 1: `$in`. Non-regex members become sorted, deduplicated
    /// equality intervals; regex members each contribute their own
    /// `from_regex_like` range, unioned in.
    fn from_in(value: &Value) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| DocIdxError::user(codes::INVALID_IN, ErrorOrigin::FieldRange, "$in requires an array"))?;

        let mut scalars: Vec<&Value> = items.iter().filter(|item| !matches!(item, Value::Regex(_))).collect();
        scalars.sort_by(|a, b| Value::canonical_cmp(a, b));
        scalars.dedup_by(|a, b| Value::canonical_cmp(a, b) == Ordering::Equal);

        let mut range = Self {
            intervals: scalars.into_iter().map(|v| Interval::equality(v.clone())).collect(),
            special: None,
        };

        for item in items.iter().filter(|item| matches!(item, Value::Regex(_))) {
            let regex_range = Self::from_regex_like(item, false)?;
            range |= &regex_range;
        }

        Ok(range)
    }

    /// Cases 4 (negation rewrite) through 9 (`$near`/`$within`), plus the
    /// default no-op for operators that carry no tightenable bound
    /// (`$ne`, bare `$regex`/`$options`, `$elemMatch` reached here by
    /// mistake, and unrecognized keys).
    fn from_op_tag(op: OpTag, value: &Value, is_not: bool, optimize: bool) -> Result<Self> {
        let op = if is_not { op.negate() } else { op };

        let mut range = match op {
            OpTag::Equality => Self::from_single(Interval::equality(value.clone())),
            OpTag::Lt => Self::from_single(Interval::new(
                Bound::inclusive(Value::MinKey),
                Bound::exclusive(value.clone()),
            )),
            OpTag::Lte => Self::from_single(Interval::new(
                Bound::inclusive(Value::MinKey),
                Bound::inclusive(value.clone()),
            )),
            OpTag::Gt => Self::from_single(Interval::new(
                Bound::exclusive(value.clone()),
                Bound::inclusive(Value::MaxKey),
            )),
            OpTag::Gte => Self::from_single(Interval::new(
                Bound::inclusive(value.clone()),
                Bound::inclusive(Value::MaxKey),
            )),
            OpTag::All => Self::from_all(value)?,
            OpTag::Mod => Self::type_bracket(TypeTag::Number),
            OpTag::Type => match value.as_number().and_then(|code| TypeTag::from_code(code as i64)) {
                Some(tag) => Self::type_bracket(tag),
                None => Self::universal(),
            },
            OpTag::ElemMatch => {
                log::warn!("$elemMatch reached FieldRange construction directly; treating as unconstrained");
                Self::universal()
            }
            OpTag::Near | OpTag::Within => {
                let mut range = Self::universal();
                range.special = Some("2d".to_string());
                range
            }
            OpTag::Regex | OpTag::Options | OpTag::Ne | OpTag::In => Self::universal(),
        };

        if optimize {
            range.apply_optimization();
        }
        Ok(range)
    }

    fn type_bracket(tag: TypeTag) -> Self {
        Self::from_single(Interval::new(
            Bound::inclusive(min_for_type(tag)),
            Bound::exclusive(max_for_type(tag)),
        ))
    }

    /// Case 6: `$all`. Bound to the first non-regex, non-`$elemMatch`
    /// element as an equality; failing that, the first regex element
    /// with a non-empty extractable prefix as a `[prefix, prefix⁺)`
    /// range. An `$all` with nothing usable stays universal.
    fn from_all(value: &Value) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| DocIdxError::user(codes::ALL_REQUIRES_ARRAY, ErrorOrigin::FieldRange, "$all requires an array"))?;

        for item in items {
            if is_elem_match_wrapper(item) {
                continue;
            }
            if !matches!(item, Value::Regex(_)) {
                return Ok(Self::from_single(Interval::equality(item.clone())));
            }
        }
        for item in items {
            if let Value::Regex(re) = item {
                let (prefix, _pure) = simple_regex(&re.pattern, &re.flags);
                if !prefix.is_empty() {
                    let end = simple_regex_end(&prefix);
                    return Ok(Self::from_single(Interval::new(
                        Bound::inclusive(Value::String(prefix)),
                        Bound::exclusive(Value::String(end)),
                    )));
                }
            }
        }
        Ok(Self::universal())
    }

    /// Tighten an open side to its type bracket when the other side is a
    /// simple scalar — e.g. `{a: {$gt: 5}}` narrows from `(5, MaxKey]` to
    /// `(5, maxForType(Number))`, restricting the scan to the `Number`
    /// family instead of walking every type greater than 5.
    ///
    /// Mirrors the original's `appendMaxForType`/`appendMinForType`
    /// substitution exactly, including leaving the bound's inclusivity
    /// flag untouched — for `String`, whose bracket maximum is the next
    /// family's minimum (an empty `Object`), this can leave the interval
    /// inclusive of that one boundary object. That narrow edge case ships
    /// unchanged; see DESIGN.md.
    fn apply_optimization(&mut self) {
        if self.intervals.len() != 1 {
            return;
        }
        let interval = &mut self.intervals[0];
        let lower_is_min = matches!(interval.lower.value, Value::MinKey);
        let upper_is_max = matches!(interval.upper.value, Value::MaxKey);

        if !lower_is_min && upper_is_max && is_simple_scalar(&interval.lower.value) {
            interval.upper.value = max_for_type(interval.lower.value.canonical_tag());
        } else if lower_is_min && !upper_is_max && is_simple_scalar(&interval.upper.value) {
            interval.lower.value = min_for_type(interval.upper.value.canonical_tag());
        }
    }

    // ---- algebra ------------------------------------------------------

    /// Narrow `self` to the set of values both `self` and `other` allow.
    fn intersect_assign(&mut self, other: &Self) {
        let mut result = Vec::new();
        let (mut i, mut j) = (0usize, 0usize);
        while i < self.intervals.len() && j < other.intervals.len() {
            let a = &self.intervals[i];
            let b = &other.intervals[j];
            let lower = tightest_lower(&a.lower, &b.lower);
            let upper = tightest_upper(&a.upper, &b.upper);
            let combined = Interval::new(lower, upper);
            let advance_left = combined.upper == a.upper;
            if combined.valid() {
                result.push(combined);
            }
            if advance_left {
                i += 1;
            } else {
                j += 1;
            }
        }
        self.finish(other);
        self.intervals = result;
    }

    /// Widen `self` to the set of values either `self` or `other` allow.
    fn union_assign(&mut self, other: &Self) {
        let mut result = Vec::new();
        let mut acc: Option<Interval> = None;
        let (mut i, mut j) = (0usize, 0usize);

        while i < self.intervals.len() && j < other.intervals.len() {
            if union_pick_left(&self.intervals[i].lower, &other.intervals[j].lower) {
                handle_union_interval(&self.intervals[i].clone(), &mut acc, &mut result);
                i += 1;
            } else {
                handle_union_interval(&other.intervals[j].clone(), &mut acc, &mut result);
                j += 1;
            }
        }
        while i < self.intervals.len() {
            handle_union_interval(&self.intervals[i].clone(), &mut acc, &mut result);
            i += 1;
        }
        while j < other.intervals.len() {
            handle_union_interval(&other.intervals[j].clone(), &mut acc, &mut result);
            j += 1;
        }
        if let Some(last) = acc {
            result.push(last);
        }

        self.finish(other);
        self.intervals = result;
    }

    /// Remove from `self` every value `other` allows.
    fn difference_assign(&mut self, other: &Self) {
        let (mut i, mut j) = (0usize, 0usize);
        while i < self.intervals.len() && j < other.intervals.len() {
            let left_starts_first = {
                let a = &self.intervals[i].lower;
                let b = &other.intervals[j].lower;
                match Value::canonical_cmp(&a.value, &b.value) {
                    Ordering::Less => true,
                    Ordering::Greater => false,
                    Ordering::Equal => a.inclusive && !b.inclusive,
                }
            };

            if left_starts_first {
                let cmp = Value::canonical_cmp(&self.intervals[i].upper.value, &other.intervals[j].lower.value);
                match cmp {
                    Ordering::Less => {
                        i += 1;
                    }
                    Ordering::Equal => {
                        if self.intervals[i].upper.inclusive && other.intervals[j].lower.inclusive {
                            self.intervals[i].upper.inclusive = false;
                        }
                        i += 1;
                    }
                    Ordering::Greater => {
                        let a_upper = &self.intervals[i].upper;
                        let b_upper = &other.intervals[j].upper;
                        let trim = match Value::canonical_cmp(&a_upper.value, &b_upper.value) {
                            Ordering::Less => true,
                            Ordering::Greater => false,
                            Ordering::Equal => !a_upper.inclusive || b_upper.inclusive,
                        };
                        if trim {
                            self.intervals[i].upper = other.intervals[j].lower.flip_inclusive();
                            i += 1;
                        } else {
                            j += 1;
                        }
                    }
                }
            } else {
                let a_lower = &self.intervals[i].lower;
                let b_upper = &other.intervals[j].upper;
                let past = match Value::canonical_cmp(&a_lower.value, &b_upper.value) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => !a_lower.inclusive || !b_upper.inclusive,
                };
                if past {
                    j += 1;
                } else {
                    let a_upper = &self.intervals[i].upper;
                    let fully_inside = match Value::canonical_cmp(&a_upper.value, &b_upper.value) {
                        Ordering::Less => true,
                        Ordering::Greater => false,
                        Ordering::Equal => !a_upper.inclusive || b_upper.inclusive,
                    };
                    if fully_inside {
                        self.intervals.remove(i);
                    } else {
                        self.intervals[i].lower = other.intervals[j].upper.flip_inclusive();
                        j += 1;
                    }
                }
            }
        }
        self.finish(other);
    }
}

fn is_simple_scalar(value: &Value) -> bool {
    matches!(value, Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_))
}

/// Union sweep tie-break: prefer the left side on an exact tie only when
/// its lower bound is inclusive (mirrors the original comparator exactly
/// — on a tie with the left bound exclusive, the right side is taken
/// regardless of its own inclusivity).
fn union_pick_left(a: &Bound, b: &Bound) -> bool {
    match Value::canonical_cmp(&a.value, &b.value) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => a.inclusive,
    }
}

fn handle_union_interval(interval: &Interval, acc: &mut Option<Interval>, out: &mut Vec<Interval>) {
    match acc.take() {
        None => *acc = Some(interval.clone()),
        Some(mut current) => {
            if current.adjoins_or_overlaps(interval) {
                current.upper = interval.upper.clone();
                *acc = Some(current);
            } else {
                out.push(current);
                *acc = Some(interval.clone());
            }
        }
    }
}

impl BitAndAssign<&Self> for FieldRange {
    fn bitand_assign(&mut self, rhs: &Self) {
        self.intersect_assign(rhs);
    }
}

impl BitOrAssign<&Self> for FieldRange {
    fn bitor_assign(&mut self, rhs: &Self) {
        self.union_assign(rhs);
    }
}

impl SubAssign<&Self> for FieldRange {
    fn sub_assign(&mut self, rhs: &Self) {
        self.difference_assign(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn gt_then_lt_intersects_to_open_interval() {
        let mut range = FieldRange::from_operator("$gt", &num(1.0), false, false).unwrap();
        let upper = FieldRange::from_operator("$lt", &num(10.0), false, false).unwrap();
        range &= &upper;
        assert_eq!(range.intervals.len(), 1);
        assert_eq!(range.intervals[0].lower, Bound::exclusive(num(1.0)));
        assert_eq!(range.intervals[0].upper, Bound::exclusive(num(10.0)));
    }

    #[test]
    fn disjoint_equalities_intersect_to_empty() {
        let mut a = FieldRange::from_op_tag(OpTag::Equality, &num(1.0), false, false).unwrap();
        let b = FieldRange::from_op_tag(OpTag::Equality, &num(2.0), false, false).unwrap();
        a &= &b;
        assert!(a.is_empty());
    }

    #[test]
    fn in_deduplicates_and_sorts() {
        let arr = Value::Array(vec![num(3.0), num(1.0), num(3.0), num(2.0)]);
        let range = FieldRange::from_in(&arr).unwrap();
        let values: Vec<_> = range.intervals.iter().map(|i| i.lower.value.clone()).collect();
        assert_eq!(values, vec![num(1.0), num(2.0), num(3.0)]);
    }

    #[test]
    fn not_gt_rewrites_to_lte() {
        let range = FieldRange::from_operator("$gt", &num(5.0), true, false).unwrap();
        assert_eq!(range.intervals[0].lower, Bound::inclusive(Value::MinKey));
        assert_eq!(range.intervals[0].upper, Bound::inclusive(num(5.0)));
    }

    #[test]
    fn union_merges_overlapping_intervals() {
        let mut a = FieldRange::from_single(Interval::new(Bound::inclusive(num(1.0)), Bound::inclusive(num(5.0))));
        let b = FieldRange::from_single(Interval::new(Bound::inclusive(num(3.0)), Bound::inclusive(num(10.0))));
        a |= &b;
        assert_eq!(a.intervals.len(), 1);
        assert_eq!(a.intervals[0].lower.value, num(1.0));
        assert_eq!(a.intervals[0].upper.value, num(10.0));
    }

    #[test]
    fn union_keeps_disjoint_intervals_separate() {
        let mut a = FieldRange::from_single(Interval::new(Bound::inclusive(num(1.0)), Bound::inclusive(num(2.0))));
        let b = FieldRange::from_single(Interval::new(Bound::inclusive(num(10.0)), Bound::inclusive(num(20.0))));
        a |= &b;
        assert_eq!(a.intervals.len(), 2);
    }

    #[test]
    fn difference_leaves_wholly_contained_subtrahend_unchanged() {
        // A subtrahend strictly inside the minuend doesn't split it: the
        // algorithm only ever trims one edge or drops a whole interval,
        // it never inserts a new one, matching queryutil.cpp:471.
        let mut a = FieldRange::from_single(Interval::new(Bound::inclusive(num(1.0)), Bound::inclusive(num(10.0))));
        let b = FieldRange::from_single(Interval::new(Bound::inclusive(num(4.0)), Bound::inclusive(num(6.0))));
        a -= &b;
        assert_eq!(a.intervals.len(), 1);
        assert_eq!(a.intervals[0].lower, Bound::inclusive(num(1.0)));
        assert_eq!(a.intervals[0].upper, Bound::inclusive(num(10.0)));
    }

    #[test]
    fn difference_trims_overlapping_edge() {
        let mut a = FieldRange::from_single(Interval::new(Bound::inclusive(num(1.0)), Bound::inclusive(num(10.0))));
        let b = FieldRange::from_single(Interval::new(Bound::inclusive(num(6.0)), Bound::inclusive(num(20.0))));
        a -= &b;
        assert_eq!(a.intervals.len(), 1);
        assert_eq!(a.intervals[0].lower, Bound::inclusive(num(1.0)));
        assert_eq!(a.intervals[0].upper, Bound::exclusive(num(6.0)));
    }

    #[test]
    fn difference_of_self_is_empty() {
        let mut a = FieldRange::from_single(Interval::new(Bound::inclusive(num(1.0)), Bound::inclusive(num(10.0))));
        let b = a.clone();
        a -= &b;
        assert!(a.is_empty());
    }

    #[test]
    fn regex_with_prefix_builds_scan_and_self_equality() {
        let re = Value::Regex(ValueRegex::new("^foo".to_string(), String::new()));
        let range = FieldRange::from_literal(&re, false, false).unwrap();
        assert_eq!(range.intervals.len(), 2);
        assert_eq!(range.intervals[0].lower.value, Value::String("foo".to_string()));
        assert_eq!(range.intervals[0].upper.value, Value::String("fop".to_string()));
        assert!(range.intervals[1].is_equality());
    }

    #[test]
    fn negated_regex_is_universal() {
        let re = Value::Regex(ValueRegex::new("^foo".to_string(), String::new()));
        let range = FieldRange::from_literal(&re, true, false).unwrap();
        assert!(!range.is_nontrivial());
    }

    #[test]
    fn optimize_narrows_open_side_to_type_bracket() {
        let range = FieldRange::from_operator("$gt", &num(5.0), false, true).unwrap();
        assert_eq!(range.intervals[0].upper.value, max_for_type(TypeTag::Number));
    }
}
