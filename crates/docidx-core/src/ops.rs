//! Query operator vocabulary (spec §6's `getGtLtOp` tag set).

use crate::value::Value;

///
/// OpTag
///
/// The recognized query operators this crate's interval algebra reasons
/// about. Unrecognized or absent operator keys classify as `Equality` —
/// the same default a plain scalar field value gets.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpTag {
    Equality,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    All,
    Mod,
    Type,
    Regex,
    Options,
    ElemMatch,
    Near,
    Within,
}

impl OpTag {
    /// Map an operator keyword (`"$gte"`, `"$in"`, ...) to its tag.
    /// Unrecognized keywords classify as `Equality`.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key {
            "$ne" => Self::Ne,
            "$lt" => Self::Lt,
            "$lte" => Self::Lte,
            "$gt" => Self::Gt,
            "$gte" => Self::Gte,
            "$in" => Self::In,
            "$all" => Self::All,
            "$mod" => Self::Mod,
            "$type" => Self::Type,
            "$regex" => Self::Regex,
            "$options" => Self::Options,
            "$elemMatch" => Self::ElemMatch,
            "$near" => Self::Near,
            "$within" => Self::Within,
            _ => Self::Equality,
        }
    }

    /// Negation rewrite used under `$not` (spec §4.2 case 4).
    ///
    /// `Equality`/`$all`/`$mod`/`$type` rewrite to `Ne` — there is no
    /// tightenable bound for "not this exact value/array/mod-result/type",
    /// so the field stays unconstrained. Ordered comparisons flip to
    /// their complements. Everything else is unaffected — `$not` over
    /// `$in`, `$regex`, `$near`, etc. is accepted syntactically but does
    /// not tighten the range (see spec's negated-regex non-goal).
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::Equality | Self::All | Self::Mod | Self::Type => Self::Ne,
            Self::Ne => Self::Equality,
            Self::Lt => Self::Gte,
            Self::Lte => Self::Gt,
            Self::Gt => Self::Lte,
            Self::Gte => Self::Lt,
            other => other,
        }
    }
}

/// The top-level classification of a field's query value: whether the
/// whole value denotes an equality clause, or is an operator document
/// whose first key needs to be inspected.
///
/// This unwraps one level of nesting (unlike [`OpTag::from_key`], which
/// classifies an operator key directly) — it mirrors the original query
/// planner's distinction between "does this whole clause look like a
/// literal value" and "what operator is this sub-element".
#[must_use]
pub fn classify_clause(value: &Value) -> OpTag {
    if let Value::Object(doc) = value {
        if let Some((key, _)) = doc.first() {
            return OpTag::from_key(key);
        }
    }
    OpTag::Equality
}

/// Whether an object's first key is `$not`.
#[must_use]
pub fn is_not_wrapper(value: &Value) -> bool {
    matches!(value.as_object().and_then(Document::first_key), Some("$not"))
}

/// Whether an object's first key is `$elemMatch`.
#[must_use]
pub fn is_elem_match_wrapper(value: &Value) -> bool {
    matches!(value.as_object().and_then(Document::first_key), Some("$elemMatch"))
}

/// Whether a value is an object carrying a `$regex` key (the
/// `{$regex: ..., $options: ...}` spelling of a regex clause).
#[must_use]
pub fn has_regex_key(value: &Value) -> bool {
    matches!(value, Value::Object(doc) if doc.get("$regex").is_some())
}

use crate::value::Document;

trait FirstKey {
    fn first_key(&self) -> Option<&str>;
}

impl FirstKey for Document {
    fn first_key(&self) -> Option<&str> {
        self.first().map(|(name, _)| name)
    }
}
