mod compare;
mod rank;
mod tag;


use derive_more::{Deref, DerefMut};
use std::cmp::Ordering;

pub use tag::TypeTag;

///
/// Regex
///
/// A regular expression literal as it appears in a query document: the
/// raw pattern text plus a subset of single-character PCRE flags (`i`,
/// `m`, `x`, ...). Flag *semantics* beyond `m`/`x` are not interpreted by
/// this crate — they are opaque to interval construction except where
/// `regex_prefix` inspects them.
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Regex {
    pub pattern: String,
    pub flags: String,
}

impl Regex {
    #[must_use]
    pub const fn new(pattern: String, flags: String) -> Self {
        Self { pattern, flags }
    }
}

///
/// Document
///
/// An ordered sequence of `(field name, value)` pairs. Document field
/// order is significant: it is what "first element" access means for
/// `$all`/array-equality/`$elemMatch` unwrapping (see `field_range`).
///
#[derive(Clone, Debug, Default, Eq, PartialEq, Deref, DerefMut)]
pub struct Document(Vec<(String, Value)>);

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a (String, Value);
    type IntoIter = std::slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Document {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, Value)>) -> Self {
        Self(pairs)
    }

    #[must_use]
    pub fn first(&self) -> Option<(&str, &Value)> {
        self.0.first().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.0.push((name.into(), value));
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

///
/// Value
///
/// The query/document value model this crate plans index bounds over.
/// Totally ordered via `canonical_cmp`; the order is the only thing that
/// matters for interval construction — it is not meant to mirror any one
/// wire format's type-tag byte values (only `TypeTag`'s codes borrow a
/// familiar numbering).
///
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Global ordering minimum. Never equal to anything but itself.
    MinKey,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Self>),
    Object(Document),
    Regex(Regex),
    /// Global ordering maximum. Never equal to anything but itself.
    MaxKey,
}

impl Value {
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::Array(_) | Self::Object(_))
    }

    #[must_use]
    pub const fn as_array(&self) -> Option<&Vec<Self>> {
        if let Self::Array(items) = self {
            Some(items)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&Document> {
        if let Self::Object(doc) = self {
            Some(doc)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_regex(&self) -> Option<&Regex> {
        if let Self::Regex(re) = self {
            Some(re)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        if let Self::Number(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    /// Stable canonical type tag used by `$type` and the optimization pass.
    #[must_use]
    pub(crate) const fn canonical_tag(&self) -> TypeTag {
        tag::canonical_tag(self)
    }

    /// Stable canonical rank used by all cross-variant ordering surfaces.
    #[must_use]
    pub(crate) const fn canonical_rank(&self) -> u8 {
        rank::canonical_rank(self)
    }

    /// Total canonical comparator used by bound/interval/index-key surfaces.
    #[must_use]
    pub fn canonical_cmp(left: &Self, right: &Self) -> Ordering {
        compare::canonical_cmp(left, right)
    }
}

impl Eq for Value {}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        Self::canonical_cmp(self, other)
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Successor family in the canonical type order, if any.
const fn next_family(tag: TypeTag) -> Option<TypeTag> {
    match tag {
        TypeTag::MinKey => Some(TypeTag::Null),
        TypeTag::Null => Some(TypeTag::Bool),
        TypeTag::Bool => Some(TypeTag::Number),
        TypeTag::Number => Some(TypeTag::String),
        TypeTag::String => Some(TypeTag::Object),
        TypeTag::Object => Some(TypeTag::Array),
        TypeTag::Array => Some(TypeTag::Regex),
        TypeTag::Regex => Some(TypeTag::MaxKey),
        TypeTag::MaxKey => None,
    }
}

/// The canonical minimum concrete value of a type family.
///
/// Every value of this family compares `>=` this value, and every value
/// of a lower-ranked family compares strictly less.
#[must_use]
pub fn min_for_type(tag: TypeTag) -> Value {
    match tag {
        TypeTag::MinKey => Value::MinKey,
        TypeTag::Null => Value::Null,
        TypeTag::Bool => Value::Bool(false),
        TypeTag::Number => Value::Number(f64::NEG_INFINITY),
        TypeTag::String => Value::String(String::new()),
        TypeTag::Object => Value::Object(Document::new()),
        TypeTag::Array => Value::Array(Vec::new()),
        TypeTag::Regex => Value::Regex(Regex::new(String::new(), String::new())),
        TypeTag::MaxKey => Value::MaxKey,
    }
}

/// The canonical maximum bracket for a type family.
///
/// This is the minimum value of the *next* family — families are
/// contiguous in the canonical order, so the tightest exclusive upper
/// bound for family `t` is exactly `min_for_type(next(t))`. Callers that
/// need an inclusive bracket around a whole family should pair
/// `min_for_type`/`max_for_type` with an exclusive upper bound.
#[must_use]
pub fn max_for_type(tag: TypeTag) -> Value {
    match next_family(tag) {
        Some(next) => min_for_type(next),
        None => Value::MaxKey,
    }
}
