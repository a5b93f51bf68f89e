//! Size limits for property paths coming from outside the registry.

use thiserror::Error;

use crate::types::{PathSegment, PropPath};

/// Maximum allowed UI path string length, in characters.
pub const MAX_UI_PATH_LENGTH: usize = 1024;

/// Maximum allowed path depth.
pub const MAX_PATH_DEPTH: usize = 256;

/// Largest array index a write may use. Writing grows the array up to the
/// index, so this also bounds how much a single write can allocate.
pub const MAX_ARRAY_INDEX: usize = 65_535;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("property path is {len} characters long, the limit is {}", MAX_UI_PATH_LENGTH)]
    PathTooLong { len: usize },
    #[error("property path is {depth} levels deep, the limit is {}", MAX_PATH_DEPTH)]
    PathTooDeep { depth: usize },
    #[error("array index {index} is too large, the limit is {}", MAX_ARRAY_INDEX)]
    IndexTooLarge { index: usize },
}

/// Validate the length of a UI path before parsing it.
///
/// # Example
///
/// ```
/// use xregistry_prop_path::validate_ui_path;
///
/// validate_ui_path("a.b[1]").unwrap();
/// validate_ui_path(&"a".repeat(2000)).unwrap_err();
/// ```
pub fn validate_ui_path(path: &str) -> Result<(), ValidationError> {
    let len = path.chars().count();
    if len > MAX_UI_PATH_LENGTH {
        return Err(ValidationError::PathTooLong { len });
    }
    Ok(())
}

/// Validate the depth and array indices of a parsed path.
///
/// # Example
///
/// ```
/// use xregistry_prop_path::{validate_path, PropPath, ValidationError};
///
/// validate_path(&PropPath::from_ui("a[3].b").unwrap()).unwrap();
/// assert_eq!(
///     validate_path(&PropPath::from_ui("a[4000000000000000]").unwrap()),
///     Err(ValidationError::IndexTooLarge { index: 4_000_000_000_000_000 })
/// );
/// ```
pub fn validate_path(path: &PropPath) -> Result<(), ValidationError> {
    if path.len() > MAX_PATH_DEPTH {
        return Err(ValidationError::PathTooDeep { depth: path.len() });
    }
    if let Some(index) = path
        .iter()
        .filter_map(PathSegment::index)
        .find(|idx| *idx > MAX_ARRAY_INDEX)
    {
        return Err(ValidationError::IndexTooLarge { index });
    }
    Ok(())
}
