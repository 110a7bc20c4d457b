use crate::value::{Regex, Value};
use std::cmp::Ordering;

/// Total canonical comparator used by every interval, bound, and index-key
/// surface in this crate.
///
/// Ordering rules:
/// 1. Canonical family rank (`MinKey < Null < Bool < Number < String <
///    Object < Array < Regex < MaxKey`).
/// 2. Variant-specific structural comparison for same-ranked values.
///
/// This is a total order: any two values compare, including values of
/// different families (rank-only in that case).
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.canonical_rank().cmp(&right.canonical_rank());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::MinKey, Value::MinKey) | (Value::MaxKey, Value::MaxKey) | (Value::Null, Value::Null) => {
            Ordering::Equal
        }
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Object(a), Value::Object(b)) => canonical_cmp_document(a.as_slice(), b.as_slice()),
        (Value::Array(a), Value::Array(b)) => canonical_cmp_list(a, b),
        (Value::Regex(a), Value::Regex(b)) => canonical_cmp_regex(a, b),
        _ => Ordering::Equal,
    }
}

fn canonical_cmp_list(left: &[Value], right: &[Value]) -> Ordering {
    for (left, right) in left.iter().zip(right.iter()) {
        let cmp = canonical_cmp(left, right);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

fn canonical_cmp_document(left: &[(String, Value)], right: &[(String, Value)]) -> Ordering {
    for ((left_name, left_value), (right_name, right_value)) in left.iter().zip(right.iter()) {
        let name_cmp = left_name.cmp(right_name);
        if name_cmp != Ordering::Equal {
            return name_cmp;
        }

        let value_cmp = canonical_cmp(left_value, right_value);
        if value_cmp != Ordering::Equal {
            return value_cmp;
        }
    }

    left.len().cmp(&right.len())
}

fn canonical_cmp_regex(left: &Regex, right: &Regex) -> Ordering {
    left.pattern
        .cmp(&right.pattern)
        .then_with(|| left.flags.cmp(&right.flags))
}
