//! Textual encodings of a [`PropPath`].
//!
//! * UI form: `a.b[3]['x.y']`, used in API requests and responses.
//! * DB form: `a,b,#3,x.y,`, used as a storage key. Changing either
//!   character below breaks every persisted key.
//! * Abstract form: `a,b,#,x.y`, the DB form with array positions erased,
//!   used to look up model definitions by shape.

use crate::types::{PathSegment, PropPath};

/// Separates named segments in UI form.
pub const UI_SEPARATOR: char = '.';

/// Terminates every segment in DB form.
pub const DB_SEPARATOR: char = ',';

/// Marks an array segment in DB and abstract form.
pub const DB_INDEX_MARKER: char = '#';

/// A UI path starting with this is a single registry meta property.
pub const META_PREFIX: char = '#';

/// Check if `name` can be written without `['...']` in UI form.
///
/// # Example
///
/// ```
/// use xregistry_prop_path::is_bare_name;
///
/// assert!(is_bare_name("my-attr_2"));
/// assert!(is_bare_name("*"));
/// assert!(!is_bare_name("x.y"));
/// assert!(!is_bare_name("-a"));
/// assert!(!is_bare_name(""));
/// ```
pub fn is_bare_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '*' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '*' || c == '-')
}

/// A lone segment starting with `.` or `#` is a synthetic top-level property
/// and is stored literally.
fn meta_name(path: &PropPath) -> Option<&str> {
    match path.segments() {
        [PathSegment::Name(name)] if name.starts_with('.') || name.starts_with(META_PREFIX) => {
            Some(name.as_str())
        }
        _ => None,
    }
}

/// Format a path in UI form.
///
/// Names that are not bare identifiers (see [`is_bare_name`]) are written as
/// `['name']` so the result parses back to the same path. A lone `#` meta
/// name is written as is.
///
/// # Example
///
/// ```
/// use xregistry_prop_path::{to_ui, PropPath};
///
/// let path = PropPath::new().with_prop("a").with_index(3).with_prop("x.y");
/// assert_eq!(to_ui(&path), "a[3]['x.y']");
/// ```
pub fn to_ui(path: &PropPath) -> String {
    if let [PathSegment::Name(name)] = path.segments() {
        if name.starts_with(META_PREFIX) {
            return name.clone();
        }
    }

    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        match segment {
            PathSegment::Index(idx) => {
                out.push('[');
                out.push_str(&idx.to_string());
                out.push(']');
            }
            PathSegment::Name(name) if is_bare_name(name) => {
                if i > 0 {
                    out.push(UI_SEPARATOR);
                }
                out.push_str(name);
            }
            PathSegment::Name(name) => {
                out.push_str("['");
                out.push_str(name);
                out.push_str("']");
            }
        }
    }
    out
}

/// Format a path as a storage key.
///
/// # Example
///
/// ```
/// use xregistry_prop_path::{to_db, PropPath};
///
/// let path = PropPath::new().with_prop("a").with_index(3).with_prop("b");
/// assert_eq!(to_db(&path), "a,#3,b,");
/// assert_eq!(to_db(&PropPath::new().with_prop("#resource")), "#resource");
/// ```
pub fn to_db(path: &PropPath) -> String {
    if let Some(name) = meta_name(path) {
        return name.to_string();
    }

    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Name(name) => out.push_str(name),
            PathSegment::Index(idx) => {
                out.push(DB_INDEX_MARKER);
                out.push_str(&idx.to_string());
            }
        }
        out.push(DB_SEPARATOR);
    }
    out
}

/// Parse a storage key produced by [`to_db`].
///
/// Keys are only ever produced internally, so this does no validation: a key
/// without the trailing separator is a literal meta property, and a part is
/// an index only when it is the marker followed by digits.
pub fn parse_db(s: &str) -> PropPath {
    if s.is_empty() {
        return PropPath::new();
    }
    let Some(body) = s.strip_suffix(DB_SEPARATOR) else {
        return PropPath::from_segments(vec![PathSegment::Name(s.to_string())]);
    };

    let segments = body
        .split(DB_SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.strip_prefix(DB_INDEX_MARKER)
                .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|digits| digits.parse::<usize>().ok())
                .map_or_else(
                    || PathSegment::Name(part.to_string()),
                    PathSegment::Index,
                )
        })
        .collect();
    PropPath::from_segments(segments)
}

/// Format a path as a model lookup key: the DB form with array positions
/// erased and no trailing separator.
///
/// # Example
///
/// ```
/// use xregistry_prop_path::{to_abstract, PropPath};
///
/// let arr = PropPath::new().with_prop("a");
/// assert_eq!(to_abstract(&arr.with_index(3).with_prop("b")), "a,#,b");
/// assert_eq!(to_abstract(&arr.with_index(3)), to_abstract(&arr.with_index(7)));
/// ```
pub fn to_abstract(path: &PropPath) -> String {
    if let Some(name) = meta_name(path) {
        return name.to_string();
    }

    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            out.push(DB_SEPARATOR);
        }
        match segment {
            PathSegment::Name(name) => out.push_str(name),
            PathSegment::Index(_) => out.push(DB_INDEX_MARKER),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PropPathParser;

    fn ui(s: &str) -> PropPath {
        PropPathParser::parse(s).unwrap()
    }

    #[test]
    fn test_to_ui() {
        assert_eq!(to_ui(&PropPath::new()), "");
        assert_eq!(to_ui(&ui("a.b.c")), "a.b.c");
        assert_eq!(to_ui(&ui("a[3].b")), "a[3].b");
        assert_eq!(to_ui(&ui("arr[1].sub['k.1'].field")), "arr[1].sub['k.1'].field");
        assert_eq!(to_ui(&ui("mapobj['cool_key'].inint")), "mapobj.cool_key.inint");
    }

    #[test]
    fn test_to_ui_quotes_first_segment_when_needed() {
        let p = PropPath::new().with_prop("x.y").with_prop("z");
        assert_eq!(to_ui(&p), "['x.y'].z");
        assert_eq!(ui(&to_ui(&p)), p);
    }

    #[test]
    fn test_to_ui_meta() {
        let p = PropPath::new().with_prop("#resource");
        assert_eq!(to_ui(&p), "#resource");
        let nested = p.with_prop("x");
        assert_eq!(to_ui(&nested), "['#resource'].x");
        assert_eq!(ui(&to_ui(&nested)), nested);
    }

    #[test]
    fn test_to_db() {
        assert_eq!(to_db(&PropPath::new()), "");
        assert_eq!(to_db(&ui("a")), "a,");
        assert_eq!(to_db(&ui("a.b[2]['x.y']")), "a,b,#2,x.y,");
        assert_eq!(to_db(&ui("#meta")), "#meta");
        assert_eq!(to_db(&PropPath::new().with_prop(".synthetic")), ".synthetic");
    }

    #[test]
    fn test_parse_db() {
        assert!(parse_db("").is_empty());
        assert_eq!(parse_db("a,b,#2,x.y,"), ui("a.b[2]['x.y']"));
        assert_eq!(parse_db("#meta"), ui("#meta"));
        assert_eq!(
            parse_db(".synthetic"),
            PropPath::new().with_prop(".synthetic")
        );
        assert_eq!(parse_db("#0,"), PropPath::new().with_index(0));
    }

    #[test]
    fn test_parse_db_marker_without_digits_is_a_name() {
        assert_eq!(
            parse_db("a,#x,"),
            PropPath::new().with_prop("a").with_prop("#x")
        );
    }

    #[test]
    fn test_to_abstract() {
        assert_eq!(to_abstract(&PropPath::new()), "");
        assert_eq!(to_abstract(&ui("a")), "a");
        assert_eq!(to_abstract(&ui("a.b")), "a,b");
        assert_eq!(to_abstract(&ui("a[1].b[22]")), "a,#,b,#");
        assert_eq!(to_abstract(&ui("#meta")), "#meta");
        assert_ne!(to_abstract(&ui("a[1]")), to_abstract(&ui("a.b")));
    }
}
