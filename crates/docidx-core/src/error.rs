use std::fmt;
use thiserror::Error as ThisError;

///
/// DocIdxError
///
/// Structured error for query-to-index-bound translation.
///
/// Carries the stable numeric code the original query planner this crate
/// is modeled on uses for user-facing diagnostics, plus an `ErrorOrigin`
/// classifying which stage raised it. Codes are part of the documented
/// contract (see spec §6) and must not be renumbered.
///
#[derive(Debug, ThisError)]
#[error("{code}: {message}")]
pub struct DocIdxError {
    pub code: u32,
    pub origin: ErrorOrigin,
    pub class: ErrorClass,
    pub message: String,
}

impl DocIdxError {
    #[must_use]
    pub fn user(code: u32, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            code,
            origin,
            class: ErrorClass::User,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invariant(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            code: 0,
            origin,
            class: ErrorClass::InvariantViolation,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}: {}", self.origin, self.class, self.code, self.message)
    }
}

///
/// ErrorClass
/// Coarse taxonomy distinguishing documented-syntax violations from
/// internal invariant failures (see spec §7).
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    User,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::User => "user",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Which stage of translation raised the error.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    FieldRange,
    FieldRangeSet,
    Or,
    IndexBounds,
    Projection,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::FieldRange => "field_range",
            Self::FieldRangeSet => "field_range_set",
            Self::Or => "or",
            Self::IndexBounds => "index_bounds",
            Self::Projection => "projection",
        };
        write!(f, "{label}")
    }
}

///
/// Stable numeric error codes (spec §6).
///
pub mod codes {
    pub const INVALID_IN: u32 = 12580;
    pub const ALL_REQUIRES_ARRAY: u32 = 10370;
    pub const TWO_SPECIAL_FIELDS: u32 = 13033;
    pub const NOT_INVALID_OBJECT: u32 = 13034;
    pub const NOT_INVALID_TYPE: u32 = 13041;
    pub const OR_REQUIRES_NONEMPTY_ARRAY: u32 = 13262;
    pub const OR_ARRAY_MUST_CONTAIN_OBJECTS: u32 = 13263;
    pub const OR_MAY_NOT_CONTAIN_SPECIAL: u32 = 13291;
    pub const FANOUT_LIMIT_FORWARD: u32 = 13303;
    pub const FANOUT_LIMIT_REVERSE: u32 = 13304;
    pub const MIXED_INCLUDE_EXCLUDE: u32 = 10053;
    pub const DOUBLE_FIELD_MATCHER_ADD: u32 = 10371;
    pub const UNSUPPORTED_PROJECTION_KEY: u32 = 13097;
    pub const SLICE_BAD_ARGUMENT_TYPE: u32 = 13098;
    pub const SLICE_ARRAY_WRONG_SIZE: u32 = 13099;
    pub const SLICE_LIMIT_MUST_BE_POSITIVE: u32 = 13100;
}

pub type Result<T> = std::result::Result<T, DocIdxError>;
