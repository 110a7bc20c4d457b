//! Projection tree (spec §5): deciding which fields of a matched document
//! get returned, including `$slice` array windowing.

mod field_matcher;

pub use field_matcher::FieldMatcher;
