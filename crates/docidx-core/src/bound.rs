use crate::value::Value;
use std::cmp::Ordering;

///
/// Bound
///
/// One side of an `Interval`: a value plus whether that value itself is
/// included in the range.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Bound {
    pub value: Value,
    pub inclusive: bool,
}

impl Bound {
    #[must_use]
    pub const fn new(value: Value, inclusive: bool) -> Self {
        Self { value, inclusive }
    }

    #[must_use]
    pub const fn inclusive(value: Value) -> Self {
        Self::new(value, true)
    }

    #[must_use]
    pub const fn exclusive(value: Value) -> Self {
        Self::new(value, false)
    }

    #[must_use]
    pub fn flip_inclusive(&self) -> Self {
        Self::new(self.value.clone(), !self.inclusive)
    }
}

/// Tightest (most restrictive) lower bound of two: the larger value,
/// exclusive beating inclusive on ties (an exclusive bound excludes
/// strictly more than an inclusive one at the same value).
///
/// Used by intersection (`&=`) to combine two overlapping lower edges.
#[must_use]
pub(crate) fn tightest_lower(a: &Bound, b: &Bound) -> Bound {
    match Value::canonical_cmp(&a.value, &b.value) {
        Ordering::Greater => a.clone(),
        Ordering::Less => b.clone(),
        Ordering::Equal => {
            if a.inclusive {
                b.clone()
            } else {
                a.clone()
            }
        }
    }
}

/// Tightest (most restrictive) upper bound of two: the smaller value,
/// exclusive beating inclusive on ties.
///
/// Used by intersection (`&=`) to combine two overlapping upper edges.
#[must_use]
pub(crate) fn tightest_upper(a: &Bound, b: &Bound) -> Bound {
    match Value::canonical_cmp(&a.value, &b.value) {
        Ordering::Less => a.clone(),
        Ordering::Greater => b.clone(),
        Ordering::Equal => {
            if a.inclusive {
                b.clone()
            } else {
                a.clone()
            }
        }
    }
}

///
/// Interval
///
/// A closed/half-open range `[lower, upper]` over the canonical value
/// order. `valid()` rejects empty ranges; `equality()` identifies a
/// degenerate single-point range.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Interval {
    pub lower: Bound,
    pub upper: Bound,
}

impl Interval {
    #[must_use]
    pub const fn new(lower: Bound, upper: Bound) -> Self {
        Self { lower, upper }
    }

    #[must_use]
    pub fn equality(value: Value) -> Self {
        Self::new(Bound::inclusive(value.clone()), Bound::inclusive(value))
    }

    /// Whether this interval denotes a nonempty set of values.
    #[must_use]
    pub fn valid(&self) -> bool {
        match Value::canonical_cmp(&self.lower.value, &self.upper.value) {
            Ordering::Less => true,
            Ordering::Equal => self.lower.inclusive && self.upper.inclusive,
            Ordering::Greater => false,
        }
    }

    /// Whether this interval is a single point (`lower == upper`, both
    /// inclusive).
    #[must_use]
    pub fn is_equality(&self) -> bool {
        self.lower.inclusive
            && self.upper.inclusive
            && Value::canonical_cmp(&self.lower.value, &self.upper.value) == Ordering::Equal
    }

    /// Whether `self` and `other` overlap or touch closely enough that a
    /// cursor scanning both cannot distinguish the gap (see spec §4.3's
    /// union tie-break: equal bounds that are both exclusive still count
    /// as overlapping, since the btree cursor can't represent that gap).
    #[must_use]
    pub(crate) fn adjoins_or_overlaps(&self, other: &Self) -> bool {
        Value::canonical_cmp(&self.upper.value, &other.lower.value) != Ordering::Less
    }
}
