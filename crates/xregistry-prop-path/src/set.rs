use serde_json::{Map, Value};

use crate::types::{PathSegment, PropPath};
use crate::validate::MAX_ARRAY_INDEX;
use crate::PropPathError;

/// Store `value` at `path` inside an entity's attribute map.
///
/// Missing maps and arrays along the way are created. `Value::Null` deletes:
/// a key set to null is removed, and trailing null array slots are dropped.
/// An empty path with a null value clears the whole map.
///
/// The path is checked against the tree before anything is rebuilt, so on
/// error `root` is left as it was. Indices above [`MAX_ARRAY_INDEX`] are
/// rejected with [`PropPathError::IndexTooLarge`].
///
/// # Example
///
/// ```
/// use serde_json::{json, Map};
/// use xregistry_prop_path::{set_prop, PropPath};
///
/// let mut root = Map::new();
/// set_prop(&mut root, &PropPath::from_ui("a[2]").unwrap(), json!("x")).unwrap();
/// assert_eq!(json!(root), json!({"a": [null, null, "x"]}));
///
/// set_prop(&mut root, &PropPath::from_ui("a[2]").unwrap(), json!(null)).unwrap();
/// assert_eq!(json!(root), json!({"a": []}));
/// ```
pub fn set_prop(
    root: &mut Map<String, Value>,
    path: &PropPath,
    value: Value,
) -> Result<(), PropPathError> {
    if path.is_empty() {
        if !value.is_null() {
            return Err(PropPathError::EmptyPathValue);
        }
        tracing::debug!(keys = root.len(), "clearing attribute map");
        root.clear();
        return Ok(());
    }
    tracing::trace!(%path, delete = value.is_null(), "setting property");

    let current = Value::Object(std::mem::take(root));
    if let Err(err) = check(Some(&current), path.segments(), PropPath::new()) {
        if let Value::Object(map) = current {
            *root = map;
        }
        return Err(err);
    }
    match rebuild(current, path.segments(), value) {
        Value::Object(map) => {
            *root = map;
            Ok(())
        }
        _ => Err(PropPathError::NotAnObjectRoot),
    }
}

/// Return `current` with `value` stored at `path`, creating whatever
/// containers are missing.
///
/// An empty path yields `value` itself. `current` is consumed even when the
/// path does not fit it; use [`set_prop`] to keep a tree intact on error.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use xregistry_prop_path::{materialize, PropPath};
///
/// let path = PropPath::from_ui("mapobj['cool_key'].inint").unwrap();
/// let tree = materialize(json!(null), &path, json!(666)).unwrap();
/// assert_eq!(tree, json!({"mapobj": {"cool_key": {"inint": 666}}}));
/// ```
pub fn materialize(current: Value, path: &PropPath, value: Value) -> Result<Value, PropPathError> {
    check(Some(&current), path.segments(), PropPath::new())?;
    Ok(rebuild(current, path.segments(), value))
}

/// Fail if some container on the way is of the wrong kind, or an index is
/// too large to grow an array to. Null and missing nodes are fine, they get
/// created.
fn check(
    node: Option<&Value>,
    segments: &[PathSegment],
    consumed: PropPath,
) -> Result<(), PropPathError> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(());
    };
    let node = node.filter(|v| !v.is_null());

    match segment {
        PathSegment::Index(idx) => {
            if *idx > MAX_ARRAY_INDEX {
                return Err(PropPathError::IndexTooLarge {
                    at: consumed.with_index(*idx).ui(),
                    max: MAX_ARRAY_INDEX,
                });
            }
            let child = match node {
                None => None,
                Some(Value::Array(arr)) => arr.get(*idx),
                Some(_) => return Err(PropPathError::NotAnArray { at: consumed.ui() }),
            };
            check(child, rest, consumed.with_index(*idx))
        }
        PathSegment::Name(name) => {
            let child = match node {
                None => None,
                Some(Value::Object(map)) => map.get(name),
                Some(_) => return Err(PropPathError::NotAMap { at: consumed.ui() }),
            };
            check(child, rest, consumed.with_prop(name.as_str()))
        }
    }
}

/// Install `value` below `current` and hand back the new subtree for the
/// parent to store. Only called once `check` has passed.
fn rebuild(current: Value, segments: &[PathSegment], value: Value) -> Value {
    let Some((segment, rest)) = segments.split_first() else {
        return value;
    };

    match segment {
        PathSegment::Index(idx) => {
            let mut arr = match current {
                Value::Array(arr) => arr,
                _ => Vec::new(),
            };
            // `check` bounds the index, so this never saturates.
            let len = idx.checked_add(1).unwrap_or(usize::MAX);
            if arr.len() < len {
                arr.resize(len, Value::Null);
            }
            let child = std::mem::take(&mut arr[*idx]);
            arr[*idx] = rebuild(child, rest, value);
            // Interior nulls are placeholders, trailing ones never persist.
            while matches!(arr.last(), Some(Value::Null)) {
                arr.pop();
            }
            Value::Array(arr)
        }
        PathSegment::Name(name) => {
            let mut map = match current {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            let child = map.get_mut(name).map(std::mem::take).unwrap_or(Value::Null);
            let new = rebuild(child, rest, value);
            if new.is_null() {
                map.remove(name);
            } else {
                map.insert(name.clone(), new);
            }
            Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(s: &str) -> PropPath {
        PropPath::from_ui(s).unwrap()
    }

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn set(doc: Value, path: &str, value: Value) -> Value {
        let mut root = obj(doc);
        set_prop(&mut root, &p(path), value).unwrap();
        Value::Object(root)
    }

    #[test]
    fn test_set_scalar() {
        assert_eq!(set(json!({}), "a", json!(1)), json!({"a": 1}));
        assert_eq!(set(json!({"a": 1}), "a", json!("x")), json!({"a": "x"}));
    }

    #[test]
    fn test_set_creates_maps() {
        assert_eq!(
            set(json!({}), "mapobj['cool_key'].inint", json!(666)),
            json!({"mapobj": {"cool_key": {"inint": 666}}})
        );
        assert_eq!(
            set(json!({"a": {"x": 1}}), "a.b.c", json!(true)),
            json!({"a": {"x": 1, "b": {"c": true}}})
        );
    }

    #[test]
    fn test_set_array_grows() {
        assert_eq!(set(json!({}), "a[2]", json!("x")), json!({"a": [null, null, "x"]}));
        assert_eq!(
            set(json!({"a": [1]}), "a[1].k", json!(2)),
            json!({"a": [1, {"k": 2}]})
        );
        assert_eq!(
            set(json!({}), "m[1][0]", json!(5)),
            json!({"m": [null, [5]]})
        );
    }

    #[test]
    fn test_set_null_trims_trailing() {
        assert_eq!(set(json!({"a": [1, 2, 3]}), "a[2]", json!(null)), json!({"a": [1, 2]}));
        assert_eq!(
            set(json!({"a": [1, null, null, 4]}), "a[3]", json!(null)),
            json!({"a": [1]})
        );
    }

    #[test]
    fn test_set_null_keeps_interior() {
        assert_eq!(
            set(json!({"a": [1, null, 3]}), "a[1]", json!(null)),
            json!({"a": [1, null, 3]})
        );
        assert_eq!(
            set(json!({"a": [1, 2, 3]}), "a[0]", json!(null)),
            json!({"a": [null, 2, 3]})
        );
    }

    #[test]
    fn test_set_null_past_end_leaves_empty_array() {
        assert_eq!(set(json!({}), "a[3]", json!(null)), json!({"a": []}));
    }

    #[test]
    fn test_set_null_deletes_key() {
        assert_eq!(set(json!({"a": {"b": 1}}), "a.b", json!(null)), json!({"a": {}}));
        assert_eq!(set(json!({"a": 1, "b": 2}), "a", json!(null)), json!({"b": 2}));
        assert_eq!(set(json!({"a": 1}), "zz", json!(null)), json!({"a": 1}));
    }

    #[test]
    fn test_set_empty_path_clears() {
        assert_eq!(set(json!({"a": 1, "b": 2}), "", json!(null)), json!({}));
    }

    #[test]
    fn test_set_empty_path_with_value_is_error() {
        let mut root = obj(json!({"a": 1}));
        let err = set_prop(&mut root, &PropPath::new(), json!(1)).unwrap_err();
        assert_eq!(err, PropPathError::EmptyPathValue);
        assert_eq!(Value::Object(root), json!({"a": 1}));
    }

    #[test]
    fn test_set_type_mismatch_leaves_tree_untouched() {
        let mut root = obj(json!({"a": {"b": 1}, "s": "str", "keep": [1]}));
        let before = root.clone();

        let err = set_prop(&mut root, &p("a[0]"), json!(1)).unwrap_err();
        assert_eq!(err, PropPathError::NotAnArray { at: "a".into() });
        assert_eq!(root, before);

        let err = set_prop(&mut root, &p("a.b.c"), json!(1)).unwrap_err();
        assert_eq!(err, PropPathError::NotAMap { at: "a.b".into() });
        assert_eq!(root, before);

        let err = set_prop(&mut root, &p("keep.x"), json!(1)).unwrap_err();
        assert_eq!(err, PropPathError::NotAMap { at: "keep".into() });
        assert_eq!(root, before);
    }

    #[test]
    fn test_set_index_on_root_map_is_error() {
        let mut root = obj(json!({"a": 1}));
        let err = set_prop(&mut root, &p("[0]"), json!(1)).unwrap_err();
        assert_eq!(err, PropPathError::NotAnArray { at: "".into() });
        assert_eq!(Value::Object(root), json!({"a": 1}));
    }

    #[test]
    fn test_set_through_null_creates_container() {
        assert_eq!(
            set(json!({"a": null}), "a.b", json!(1)),
            json!({"a": {"b": 1}})
        );
        assert_eq!(set(json!({"a": null}), "a[0]", json!(1)), json!({"a": [1]}));
    }

    #[test]
    fn test_materialize_base_cases() {
        assert_eq!(
            materialize(json!({"x": 1}), &PropPath::new(), json!(7)).unwrap(),
            json!(7)
        );
        assert_eq!(
            materialize(Value::Null, &p("[1]"), json!("v")).unwrap(),
            json!([null, "v"])
        );
        assert!(materialize(json!(3), &p("a"), json!(1)).is_err());
    }

    #[test]
    fn test_set_replaces_subtree() {
        assert_eq!(
            set(json!({"a": {"b": {"c": 1}}}), "a.b", json!([1, 2])),
            json!({"a": {"b": [1, 2]}})
        );
    }

    #[test]
    fn test_set_huge_index_is_error() {
        let mut root = obj(json!({"a": [1, 2], "b": {"c": 3}}));
        let before = root.clone();

        for (ui, at) in [
            ("a[18446744073709551615]", "a[18446744073709551615]"),
            ("a[4000000000000000]", "a[4000000000000000]"),
            ("b.d[0][70000].x", "b.d[0][70000]"),
        ] {
            let err = set_prop(&mut root, &p(ui), json!(1)).unwrap_err();
            assert_eq!(
                err,
                PropPathError::IndexTooLarge {
                    at: at.into(),
                    max: MAX_ARRAY_INDEX
                },
                "{ui}"
            );
            assert_eq!(root, before, "{ui}");
            let err = set_prop(&mut root, &p(ui), json!(null)).unwrap_err();
            assert!(matches!(err, PropPathError::IndexTooLarge { .. }), "{ui}");
            assert_eq!(root, before, "{ui}");
        }
    }

    #[test]
    fn test_set_at_index_limit() {
        let last = PropPath::new().with_index(MAX_ARRAY_INDEX);
        let tree = materialize(Value::Null, &last, json!(1)).unwrap();
        let arr = tree.as_array().unwrap();
        assert_eq!(arr.len(), MAX_ARRAY_INDEX + 1);
        assert_eq!(arr[MAX_ARRAY_INDEX], json!(1));
        assert!(materialize(
            Value::Null,
            &PropPath::new().with_index(MAX_ARRAY_INDEX + 1),
            json!(1)
        )
        .is_err());
    }
}
