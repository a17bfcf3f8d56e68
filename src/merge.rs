//! Deep merging of JSON value trees.
//!
//! Objects merge key by key. Every other kind is a leaf: when both sides hold
//! the same kind the patch replaces the target wholesale, arrays included.
//! Kinds that differ at the same path are a conflict.

use serde_json::Value;

/// Kind of a JSON value, used in conflict diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => ValueKind::Object,
            Value::Array(_) => ValueKind::Array,
            Value::String(_) => ValueKind::String,
            Value::Number(_) => ValueKind::Number,
            Value::Bool(_) => ValueKind::Bool,
            Value::Null => ValueKind::Null,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            ValueKind::Object => "object",
            ValueKind::Array => "array",
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Bool => "boolean",
            ValueKind::Null => "null",
        };
        f.write_str(name)
    }
}

/// Error produced when two trees cannot be merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The same path holds different kinds on each side
    IncompatibleTypes {
        /// JSON pointer to the conflicting value (empty for the root)
        path: String,
        existing: ValueKind,
        incoming: ValueKind,
    },
}

impl std::fmt::Display for MergeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MergeError::IncompatibleTypes {
                path,
                existing,
                incoming,
            } => {
                let at = if path.is_empty() { "/" } else { path.as_str() };
                write!(
                    f,
                    "incompatible types at {}: cannot merge {} into {}",
                    at, incoming, existing
                )
            }
        }
    }
}

impl std::error::Error for MergeError {}

/// Merges `patch` into a copy of `target` and returns the result.
///
/// Neither input is modified.
///
/// # Example
///
/// ```
/// use openapi_from_comments::merge::merge;
/// use serde_json::json;
///
/// let merged = merge(&json!({"a": {"b": 1}}), &json!({"a": {"c": 2}})).unwrap();
/// assert_eq!(merged, json!({"a": {"b": 1, "c": 2}}));
/// ```
pub fn merge(target: &Value, patch: &Value) -> Result<Value, MergeError> {
    let mut merged = target.clone();
    merge_into(&mut merged, patch.clone())?;
    Ok(merged)
}

/// Merges `patch` into `target` in place.
///
/// The whole patch is checked before anything is written, so on error
/// `target` is exactly as it was.
pub fn merge_into(target: &mut Value, patch: Value) -> Result<(), MergeError> {
    let mut path = String::new();
    check(target, &patch, &mut path)?;
    apply(target, patch);
    Ok(())
}

fn check(target: &Value, patch: &Value, path: &mut String) -> Result<(), MergeError> {
    match (target, patch) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                if let Some(current) = existing.get(key) {
                    let len = path.len();
                    push_pointer_segment(path, key);
                    check(current, value, path)?;
                    path.truncate(len);
                }
            }
            Ok(())
        }
        _ => {
            let existing = ValueKind::of(target);
            let incoming = ValueKind::of(patch);
            if existing == incoming {
                Ok(())
            } else {
                Err(MergeError::IncompatibleTypes {
                    path: path.clone(),
                    existing,
                    incoming,
                })
            }
        }
    }
}

// Only called after `check` succeeded
fn apply(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(current) => apply(current, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

fn push_pointer_segment(path: &mut String, key: &str) {
    path.push('/');
    path.push_str(&key.replace('~', "~0").replace('/', "~1"));
}
