use std::fmt::{self, Display};

///
/// IndexField
///
/// One field of a compound index key pattern, with its scan direction.
/// `direction` is `1` for ascending, `-1` for descending — matching the
/// sign convention a key pattern like `{a: 1, b: -1}` encodes.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IndexField {
    pub name: &'static str,
    pub direction: i8,
}

impl IndexField {
    #[must_use]
    pub const fn new(name: &'static str, direction: i8) -> Self {
        Self { name, direction }
    }
}

///
/// IndexModel
///
/// Runtime-only descriptor for a compound index key pattern, consumed by
/// `IndexBoundsCompiler`. Kept decoupled from any schema/DDL shape — the
/// planner only needs the ordered field list and per-field direction.
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexModel {
    pub name: &'static str,
    pub fields: Vec<IndexField>,
}

impl IndexModel {
    #[must_use]
    pub const fn new(name: &'static str, fields: Vec<IndexField>) -> Self {
        Self { name, fields }
    }

    #[must_use]
    /// Whether this index's field prefix matches the start of another index.
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.fields.len() < other.fields.len()
            && other.fields[..self.fields.len()] == self.fields[..]
    }
}

impl Display for IndexModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self
            .fields
            .iter()
            .map(|field| format!("{}: {}", field.name, field.direction))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}: ({})", self.name, fields)
    }
}
