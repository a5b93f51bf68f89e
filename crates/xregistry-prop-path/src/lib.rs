//! Property path addressing for xRegistry attribute trees.
//!
//! A [`PropPath`] names a nested location (map key, array element, nested
//! object) inside an entity's attributes. It has three textual forms:
//!
//! - UI form, `a.b[3]['x.y']`, used by the HTTP API ([`PropPathParser`], [`to_ui`]);
//! - DB form, `a,b,#3,x.y,`, used as a storage key ([`to_db`], [`parse_db`]);
//! - abstract form, `a,b,#,x.y`, used to find the model definition of a
//!   location regardless of array position ([`to_abstract`]).
//!
//! [`get_prop`] reads a value out of a `serde_json::Value` tree and
//! [`set_prop`] writes one, creating intermediate maps and arrays as needed.
//!
//! # Example
//!
//! ```
//! use serde_json::{json, Map, Value};
//! use xregistry_prop_path::{get_prop, set_prop, PropPath};
//!
//! let path = PropPath::from_ui("mapobj['cool_key'].inint").unwrap();
//! assert_eq!(path.len(), 3);
//! assert_eq!(PropPath::from_db(&path.db()), path);
//!
//! let mut attrs = Map::new();
//! set_prop(&mut attrs, &path, json!(666)).unwrap();
//! let tree = Value::Object(attrs);
//! assert_eq!(tree, json!({"mapobj": {"cool_key": {"inint": 666}}}));
//! assert_eq!(get_prop(&tree, &path).unwrap(), Some(&json!(666)));
//! ```

use thiserror::Error;

pub mod types;
pub use types::{PathSegment, PropPath};

mod parser;
pub use parser::{ParseError, PropPathParser};

pub mod util;
pub use util::{
    is_bare_name, parse_db, to_abstract, to_db, to_ui, DB_INDEX_MARKER, DB_SEPARATOR,
    META_PREFIX, UI_SEPARATOR,
};

mod get;
pub use get::get_prop;

mod set;
pub use set::{materialize, set_prop};

pub mod validate;
pub use validate::{
    validate_path, validate_ui_path, ValidationError, MAX_ARRAY_INDEX, MAX_PATH_DEPTH,
    MAX_UI_PATH_LENGTH,
};

/// Errors from parsing a path or walking a tree with one.
///
/// `at` is the UI form of the part of the path consumed before the failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropPathError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("can't traverse into nothing: \"{at}\"")]
    NilTraversal { at: String },
    #[error("can't index into non-array: \"{at}\"")]
    NotAnArray { at: String },
    #[error("can't reference a non-map/object: \"{at}\"")]
    NotAMap { at: String },
    #[error("array reference \"{at}\" out of bounds ({})", bounds(.len))]
    OutOfBounds { at: String, len: usize },
    #[error("array reference \"{at}\" is past the largest writable index ({max})")]
    IndexTooLarge { at: String, max: usize },
    #[error("can't set an empty path to a non-null value")]
    EmptyPathValue,
    #[error("attribute root must remain a map")]
    NotAnObjectRoot,
}

fn bounds(len: &usize) -> String {
    match *len {
        0 => "array is empty".to_string(),
        n => format!("0-{}", n - 1),
    }
}
