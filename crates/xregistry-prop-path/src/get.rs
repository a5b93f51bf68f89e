use serde_json::Value;

use crate::types::{PathSegment, PropPath};
use crate::PropPathError;

/// Read the value at `path` inside `tree`.
///
/// Returns `Ok(None)` when the last segment names a key that is not there
/// (or names a key inside a non-map). Anything else that cannot be walked is
/// an error naming the prefix consumed so far. `Value::Null` is treated as
/// "nothing": it can be returned, but not traversed.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use xregistry_prop_path::{get_prop, PropPath};
///
/// let doc = json!({"a": {"b": [10, 20]}});
/// let path = PropPath::from_ui("a.b[1]").unwrap();
/// assert_eq!(get_prop(&doc, &path).unwrap(), Some(&json!(20)));
///
/// let missing = PropPath::from_ui("a.c").unwrap();
/// assert_eq!(get_prop(&doc, &missing).unwrap(), None);
/// assert!(get_prop(&doc, &PropPath::from_ui("a.b[5]").unwrap()).is_err());
/// ```
pub fn get_prop<'a>(tree: &'a Value, path: &PropPath) -> Result<Option<&'a Value>, PropPathError> {
    if path.is_empty() {
        return Ok(Some(tree));
    }
    walk(Some(tree), path.segments(), PropPath::new())
}

fn walk<'a>(
    node: Option<&'a Value>,
    segments: &[PathSegment],
    consumed: PropPath,
) -> Result<Option<&'a Value>, PropPathError> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(node);
    };
    let node = match node {
        None | Some(Value::Null) => {
            return Err(PropPathError::NilTraversal { at: consumed.ui() })
        }
        Some(node) => node,
    };

    match segment {
        PathSegment::Index(idx) => {
            let Value::Array(arr) = node else {
                return Err(PropPathError::NotAnArray { at: consumed.ui() });
            };
            let Some(child) = arr.get(*idx) else {
                return Err(PropPathError::OutOfBounds {
                    at: consumed.with_index(*idx).ui(),
                    len: arr.len(),
                });
            };
            walk(Some(child), rest, consumed.with_index(*idx))
        }
        PathSegment::Name(name) => {
            let Value::Object(map) = node else {
                // Current behavior: a key inside a scalar is "not found" when
                // it is the last step, and an error otherwise.
                if rest.is_empty() {
                    return Ok(None);
                }
                return Err(PropPathError::NotAMap { at: consumed.ui() });
            };
            match map.get(name) {
                None if rest.is_empty() => Ok(None),
                child => walk(child, rest, consumed.with_prop(name.as_str())),
            }
        }
    }
}
