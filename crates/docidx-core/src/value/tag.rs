use crate::value::Value;

///
/// TypeTag
///
/// Stable type classification for `Value`, used by `$type`, `min_for_type`/
/// `max_for_type`, and the optimization pass in `FieldRange` construction.
///
/// Codes follow the BSON type-code convention so `$type` literals in query
/// documents read the same way they would against a real document database.
///
/// IMPORTANT:
/// Codes are part of stable query behavior and must not be renumbered.
///
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TypeTag {
    MinKey = 255,
    Null = 10,
    Bool = 8,
    Number = 1,
    String = 2,
    Object = 3,
    Array = 4,
    Regex = 11,
    MaxKey = 127,
}

impl TypeTag {
    /// Resolve a BSON-style numeric type code to a `TypeTag`.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            255 => Some(Self::MinKey),
            10 => Some(Self::Null),
            8 => Some(Self::Bool),
            1 => Some(Self::Number),
            2 => Some(Self::String),
            3 => Some(Self::Object),
            4 => Some(Self::Array),
            11 => Some(Self::Regex),
            127 => Some(Self::MaxKey),
            _ => None,
        }
    }

    #[must_use]
    pub const fn to_code(self) -> i64 {
        self as i64
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MinKey => "MinKey",
            Self::Null => "Null",
            Self::Bool => "Bool",
            Self::Number => "Number",
            Self::String => "String",
            Self::Object => "Object",
            Self::Array => "Array",
            Self::Regex => "Regex",
            Self::MaxKey => "MaxKey",
        }
    }

    /// Stable family rank used for cross-type total ordering.
    ///
    /// This is the single place the type order is defined:
    /// MinKey < Null < Bool < Number < String < Object < Array < Regex < MaxKey.
    #[must_use]
    pub(super) const fn family_rank(self) -> u8 {
        match self {
            Self::MinKey => 0,
            Self::Null => 1,
            Self::Bool => 2,
            Self::Number => 3,
            Self::String => 4,
            Self::Object => 5,
            Self::Array => 6,
            Self::Regex => 7,
            Self::MaxKey => 8,
        }
    }
}

/// Stable canonical type tag for a runtime value.
#[must_use]
pub(super) const fn canonical_tag(value: &Value) -> TypeTag {
    match value {
        Value::MinKey => TypeTag::MinKey,
        Value::Null => TypeTag::Null,
        Value::Bool(_) => TypeTag::Bool,
        Value::Number(_) => TypeTag::Number,
        Value::String(_) => TypeTag::String,
        Value::Object(_) => TypeTag::Object,
        Value::Array(_) => TypeTag::Array,
        Value::Regex(_) => TypeTag::Regex,
        Value::MaxKey => TypeTag::MaxKey,
    }
}
