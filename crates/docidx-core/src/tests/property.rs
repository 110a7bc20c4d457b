//! Algebraic properties of the interval algebra (spec §8), exercised with
//! `proptest` rather than hand-picked examples — the properties are meant
//! to hold for *any* well-formed `FieldRange`, not just the scenarios
//! covered by the colocated unit tests.

use crate::bound::{Bound, Interval};
use crate::field_range::FieldRange;
use crate::regex_prefix::{simple_regex, simple_regex_end};
use crate::value::Value;
use proptest::prelude::*;

fn num(n: i32) -> Value {
    Value::Number(f64::from(n))
}

/// One raw (possibly nonsensical) interval candidate: two small integers
/// and two inclusivity flags. Turned into a real `Interval` only when the
/// pair orders validly.
fn arb_raw_interval() -> impl Strategy<Value = Option<Interval>> {
    (-8i32..8, -8i32..8, any::<bool>(), any::<bool>()).prop_map(|(a, b, li, ui)| {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if lo == hi {
            if li && ui {
                Some(Interval::new(Bound::inclusive(num(lo)), Bound::inclusive(num(hi))))
            } else {
                None
            }
        } else {
            Some(Interval::new(Bound::new(num(lo), li), Bound::new(num(hi), ui)))
        }
    })
}

/// A well-formed `FieldRange` over small integers: a handful of raw
/// candidate intervals unioned together, which normalizes them into the
/// sorted, disjoint form every `FieldRange` invariant requires.
fn arb_field_range() -> impl Strategy<Value = FieldRange> {
    prop::collection::vec(arb_raw_interval(), 0..6).prop_map(|candidates| {
        let mut range = FieldRange::empty();
        for candidate in candidates.into_iter().flatten() {
            let piece = FieldRange { intervals: vec![candidate], special: None };
            range |= &piece;
        }
        range
    })
}

fn is_sorted_disjoint_and_valid(range: &FieldRange) -> bool {
    if !range.intervals.iter().all(Interval::valid) {
        return false;
    }
    range.intervals.windows(2).all(|pair| {
        let (left, right) = (&pair[0], &pair[1]);
        // Strictly before, and not touching closely enough to merge: a
        // well-formed list never leaves two intervals that a cursor
        // couldn't tell apart from one.
        !left.adjoins_or_overlaps(right)
    })
}

fn same_value_set(a: &FieldRange, b: &FieldRange) -> bool {
    a.intervals == b.intervals
}

proptest! {
    #[test]
    fn well_formed_after_construction(range in arb_field_range()) {
        prop_assert!(is_sorted_disjoint_and_valid(&range));
    }

    #[test]
    fn well_formed_after_intersection(a in arb_field_range(), b in arb_field_range()) {
        let mut result = a.clone();
        result &= &b;
        prop_assert!(is_sorted_disjoint_and_valid(&result));
    }

    #[test]
    fn well_formed_after_union(a in arb_field_range(), b in arb_field_range()) {
        let mut result = a.clone();
        result |= &b;
        prop_assert!(is_sorted_disjoint_and_valid(&result));
    }

    #[test]
    fn well_formed_after_difference(a in arb_field_range(), b in arb_field_range()) {
        let mut result = a.clone();
        result -= &b;
        prop_assert!(is_sorted_disjoint_and_valid(&result));
    }

    #[test]
    fn intersection_is_idempotent(range in arb_field_range()) {
        let mut result = range.clone();
        result &= &range;
        prop_assert!(same_value_set(&result, &range));
    }

    #[test]
    fn union_is_idempotent(range in arb_field_range()) {
        let mut result = range.clone();
        result |= &range;
        prop_assert!(same_value_set(&result, &range));
    }

    #[test]
    fn difference_of_self_is_empty(range in arb_field_range()) {
        let mut result = range.clone();
        result -= &range;
        prop_assert!(result.is_empty());
    }

    #[test]
    fn intersection_is_commutative(a in arb_field_range(), b in arb_field_range()) {
        let mut ab = a.clone();
        ab &= &b;
        let mut ba = b.clone();
        ba &= &a;
        prop_assert!(same_value_set(&ab, &ba));
    }

    #[test]
    fn union_is_commutative(a in arb_field_range(), b in arb_field_range()) {
        let mut ab = a.clone();
        ab |= &b;
        let mut ba = b.clone();
        ba |= &a;
        prop_assert!(same_value_set(&ab, &ba));
    }

    /// `(a ∪ b) ∩ c == (a ∩ c) ∪ (b ∩ c)` as value sets.
    #[test]
    fn intersection_distributes_over_union(
        a in arb_field_range(),
        b in arb_field_range(),
        c in arb_field_range(),
    ) {
        let mut lhs = a.clone();
        lhs |= &b;
        lhs &= &c;

        let mut a_c = a.clone();
        a_c &= &c;
        let mut b_c = b.clone();
        b_c &= &c;
        let mut rhs = a_c;
        rhs |= &b_c;

        prop_assert!(same_value_set(&lhs, &rhs));
    }

    /// `(a ∪ b) −= b` is always a subset of `a`, and equals `a` exactly
    /// when `a` and `b` don't overlap.
    #[test]
    fn union_then_difference_recovers_subset_of_original(a in arb_field_range(), b in arb_field_range()) {
        let mut union = a.clone();
        union |= &b;
        union -= &b;

        let mut intersection = a.clone();
        intersection &= &b;

        if intersection.is_empty() {
            prop_assert!(same_value_set(&union, &a));
        } else {
            // Subset check: intersecting the recovered range with `a`
            // must leave it unchanged.
            let mut check = union.clone();
            check &= &a;
            prop_assert!(same_value_set(&check, &union));
        }
    }

    /// For any literal prefix (alnum-only, so no metacharacter stops
    /// extraction early), `^prefix` is a pure prefix match, and every
    /// string formed by appending an arbitrary suffix falls inside
    /// `[prefix, simple_regex_end(prefix))`.
    #[test]
    fn regex_prefix_is_monotone(prefix in "[a-zA-Z0-9]{0,8}", suffix in "[a-zA-Z0-9]{0,8}") {
        let pattern = format!("^{prefix}");
        let (extracted, pure) = simple_regex(&pattern, "");
        prop_assert_eq!(&extracted, &prefix);
        prop_assert_eq!(pure, !prefix.is_empty());

        if pure {
            let matched = format!("{prefix}{suffix}");
            let end = simple_regex_end(&extracted);
            prop_assert!(matched.as_str() >= extracted.as_str());
            prop_assert!(matched.as_str() < end.as_str());
        }
    }
}
