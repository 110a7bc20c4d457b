use crate::value::{Value, tag};

///
/// Canonical Value Rank
///
/// Stable rank used for cross-variant ordering. Family boundaries are
/// exact: every value of a lower-ranked family compares less than every
/// value of a higher-ranked family, with no tie-break needed across
/// families — only same-rank values fall through to a structural
/// comparator (see `compare::canonical_cmp_same_rank`).
///
/// IMPORTANT:
/// Rank order is part of deterministic query behavior and must remain
/// fixed once published.
///
#[must_use]
pub const fn canonical_rank(value: &Value) -> u8 {
    tag::canonical_tag(value).family_rank()
}
