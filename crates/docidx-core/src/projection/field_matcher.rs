use crate::error::{codes, DocIdxError, ErrorOrigin, Result};
use crate::value::{Document, Value};
use std::collections::BTreeMap;

///
/// FieldMatcher
///
/// A node in the projection tree built from a projection spec document
/// (e.g. `{a: 1, "b.c": 0, d: {$slice: 5}}`). The tree mirrors the
/// dotted-path structure of the spec; `apply` walks a source document
/// against it to build the returned shape.
///
/// `mode` tracks this node's include/exclude polarity once any plain
/// (non-`$slice`) field under it has been added — `Some(true)` means
/// listed fields are kept (and everything else dropped), `Some(false)`
/// the reverse. `None` means no plain field has been added yet at this
/// level (only nested/`$slice` children, or nothing at all).
///
#[derive(Clone, Debug, Default)]
pub struct FieldMatcher {
    pub mode: Option<bool>,
    pub include_id: bool,
    pub special: bool,
    pub skip: i64,
    pub limit: i64,
    pub children: BTreeMap<String, FieldMatcher>,
}

impl FieldMatcher {
    #[must_use]
    pub fn new() -> Self {
        Self { include_id: true, ..Self::default() }
    }

    /// Build a projection tree from a top-level projection spec document.
    pub fn build(spec: &Document) -> Result<Self> {
        let mut root = Self::new();
        for (key, value) in spec {
            if key == "_id" {
                root.include_id = truthy(value);
                continue;
            }
            root.add(key, value)?;
        }
        Ok(root)
    }

    /// Add one dotted-path projection entry under this node.
    fn add(&mut self, path: &str, value: &Value) -> Result<()> {
        let polarity = leaf_polarity(value)?;
        self.set_mode(polarity)?;

        match path.split_once('.') {
            Some((head, rest)) => {
                if !self.children.contains_key(head) {
                    self.children.insert(head.to_string(), Self::new());
                }
                let child = self.children.get_mut(head).expect("just inserted");
                child.add(rest, value)
            }
            None => self.add_leaf(path, value),
        }
    }

    fn add_leaf(&mut self, name: &str, value: &Value) -> Result<()> {
        if self.children.contains_key(name) {
            return Err(DocIdxError::user(
                codes::DOUBLE_FIELD_MATCHER_ADD,
                ErrorOrigin::Projection,
                format!("field '{name}' added to projection more than once"),
            ));
        }

        let child = if let Value::Object(doc) = value {
            if doc.get("$slice").is_some() {
                Self::build_slice(doc)?
            } else {
                Self::new()
            }
        } else {
            let mut child = Self::new();
            child.mode = Some(truthy(value));
            child
        };

        self.children.insert(name.to_string(), child);
        Ok(())
    }

    fn build_slice(doc: &Document) -> Result<Self> {
        for (key, _) in doc {
            if key != "$slice" {
                return Err(DocIdxError::user(
                    codes::UNSUPPORTED_PROJECTION_KEY,
                    ErrorOrigin::Projection,
                    format!("unsupported projection key '{key}' alongside $slice"),
                ));
            }
        }
        let slice_value = doc.get("$slice").expect("checked above");
        let (skip, limit) = match slice_value {
            Value::Number(n) => {
                let n = *n as i64;
                if n >= 0 {
                    (0, n)
                } else {
                    (n, -n)
                }
            }
            Value::Array(items) => {
                if items.len() != 2 {
                    return Err(DocIdxError::user(
                        codes::SLICE_ARRAY_WRONG_SIZE,
                        ErrorOrigin::Projection,
                        "$slice array form requires exactly two elements",
                    ));
                }
                let skip = items[0].as_number().ok_or_else(|| {
                    DocIdxError::user(codes::SLICE_BAD_ARGUMENT_TYPE, ErrorOrigin::Projection, "$slice skip must be a number")
                })? as i64;
                let limit = items[1].as_number().ok_or_else(|| {
                    DocIdxError::user(codes::SLICE_BAD_ARGUMENT_TYPE, ErrorOrigin::Projection, "$slice limit must be a number")
                })? as i64;
                if limit <= 0 {
                    return Err(DocIdxError::user(
                        codes::SLICE_LIMIT_MUST_BE_POSITIVE,
                        ErrorOrigin::Projection,
                        "$slice limit must be positive",
                    ));
                }
                (skip, limit)
            }
            _ => {
                return Err(DocIdxError::user(
                    codes::SLICE_BAD_ARGUMENT_TYPE,
                    ErrorOrigin::Projection,
                    "$slice requires a number or a two-element array",
                ))
            }
        };

        let mut child = Self::new();
        child.special = true;
        child.skip = skip;
        child.limit = limit;
        child.mode = Some(true);
        Ok(child)
    }

    fn set_mode(&mut self, polarity: bool) -> Result<()> {
        match self.mode {
            None => {
                self.mode = Some(polarity);
                Ok(())
            }
            Some(existing) if existing == polarity => Ok(()),
            Some(_) => Err(DocIdxError::user(
                codes::MIXED_INCLUDE_EXCLUDE,
                ErrorOrigin::Projection,
                "projection cannot mix inclusion and exclusion",
            )),
        }
    }

    /// Apply this projection tree to a matched document.
    #[must_use]
    pub fn apply(&self, source: &Document) -> Document {
        let mut out = Document::new();
        if self.include_id {
            if let Some(id) = source.get("_id") {
                out.push("_id", id.clone());
            }
        }

        for (name, value) in source {
            if name == "_id" {
                continue;
            }
            match self.children.get(name.as_str()) {
                Some(child) if child.special => {
                    let projected = match value.as_array() {
                        Some(items) => Value::Array(slice_array(items, child.skip, child.limit)),
                        None => value.clone(),
                    };
                    out.push(name.clone(), projected);
                }
                Some(child) if !child.children.is_empty() => {
                    out.push(name.clone(), child.append(value));
                }
                Some(child) => {
                    if child.mode.unwrap_or(true) {
                        out.push(name.clone(), value.clone());
                    }
                }
                None => {
                    if !self.mode.unwrap_or(true) {
                        out.push(name.clone(), value.clone());
                    }
                }
            }
        }
        out
    }

    /// Project a nested value (object or array of objects) one level
    /// down a dotted path. Arrays of scalars pass through untouched —
    /// there is no per-element slicing rule for a plain nested
    /// inclusion/exclusion, only for `$slice`.
    fn append(&self, value: &Value) -> Value {
        match value {
            Value::Object(sub) => Value::Object(self.apply(sub)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Object(sub) => Value::Object(self.apply(sub)),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0,
        _ => true,
    }
}

fn leaf_polarity(value: &Value) -> Result<bool> {
    match value {
        Value::Object(doc) if doc.get("$slice").is_some() => Ok(true),
        Value::Object(doc) => {
            let key = doc.first().map_or("", |(k, _)| k);
            Err(DocIdxError::user(
                codes::UNSUPPORTED_PROJECTION_KEY,
                ErrorOrigin::Projection,
                format!("unsupported projection operator '{key}'"),
            ))
        }
        other => Ok(truthy(other)),
    }
}

/// Slice an array per `$slice` skip/limit: non-negative `skip` windows
/// forward from the start; negative `skip` counts back from the end.
fn slice_array(items: &[Value], skip: i64, limit: i64) -> Vec<Value> {
    let len = items.len() as i64;
    let start = if skip >= 0 { skip.min(len) } else { (len + skip).max(0) };
    let end = (start + limit).min(len);
    if start >= end {
        return Vec::new();
    }
    items[start as usize..end as usize].to_vec()
}
