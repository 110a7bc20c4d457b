//! `$or` aggregation (spec §4.4): one `FieldRangeSet` per base (non-`$or`)
//! clause, plus one `FieldRangeSet` per `$or` arm.

use crate::error::{codes, DocIdxError, ErrorOrigin, Result};
use crate::field_range_set::FieldRangeSet;
use crate::value::{Document, Value};

///
/// FieldRangeOrSet
///
/// A query's base ranges plus its `$or` arms, each arm processed
/// independently as its own `FieldRangeSet`. Arms may not introduce a
/// special (non-btree) index requirement — a query can't fan out across
/// `$or` branches that need different access methods.
///
#[derive(Clone, Debug)]
pub struct FieldRangeOrSet {
    pub base: FieldRangeSet,
    pub arms: Vec<FieldRangeSet>,
    pub or_found: bool,
}

impl FieldRangeOrSet {
    pub fn new(ns: impl Into<String>, query: Document, optimize: bool) -> Result<Self> {
        let ns = ns.into();
        let base = FieldRangeSet::new(ns.clone(), query.clone(), optimize)?;

        let Some(or_value) = query.get("$or") else {
            return Ok(Self { base, arms: Vec::new(), or_found: false });
        };

        let items = match or_value {
            Value::Array(items) if !items.is_empty() => items,
            _ => {
                return Err(DocIdxError::user(
                    codes::OR_REQUIRES_NONEMPTY_ARRAY,
                    ErrorOrigin::Or,
                    "$or requires a nonempty array",
                ))
            }
        };

        let mut arms = Vec::with_capacity(items.len());
        for item in items {
            let arm_doc = item.as_object().ok_or_else(|| {
                DocIdxError::user(
                    codes::OR_ARRAY_MUST_CONTAIN_OBJECTS,
                    ErrorOrigin::Or,
                    "$or array elements must be objects",
                )
            })?;
            let arm = FieldRangeSet::new(ns.clone(), arm_doc.clone(), optimize)?;
            if arm.special()?.is_some() {
                return Err(DocIdxError::user(
                    codes::OR_MAY_NOT_CONTAIN_SPECIAL,
                    ErrorOrigin::Or,
                    "$or arms may not require a special index",
                ));
            }
            arms.push(arm);
        }

        Ok(Self { base, arms, or_found: true })
    }
}
