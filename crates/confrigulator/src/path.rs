//! path addressing inside a [Value] document
//!
//! A path is a string split on a delimiter (default `.`) into segments. Walking a document:
//! - an object takes the segment as key
//! - an array takes the segment as a non-negative index
//! - a scalar ends the walk; any remaining segment is "not found"
//!
//! ```
//! # use confrigulator::{document, path::PathResolver};
//! let document = document!({"root": {"a": {"b": [1, 2, 3]}}});
//! let resolver = PathResolver::default();
//!
//! assert_eq!(resolver.get("root.a.b.1", &document).unwrap().as_i64(), Some(2));
//! assert!(!resolver.exists("root.a.b.9", &document));
//! ```
use crate::value::Value;

pub const DEFAULT_DELIMITER: &str = ".";

/// Splits paths and walks documents
///
/// Holds no state besides the delimiter, so one resolver can serve any number of documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    delimiter: String,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

impl PathResolver {
    /// # Panics
    ///
    /// When `delimiter` is empty.
    pub fn new(delimiter: impl Into<String>) -> Self {
        let delimiter = delimiter.into();
        assert!(!delimiter.is_empty(), "delimiter must not be empty");
        Self { delimiter }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Splits a path into its segments
    ///
    /// Rejects the empty path and paths with empty segments (`a..b`, `.a`, `a.`).
    pub fn segments<'p>(&self, path: &'p str) -> Result<Vec<&'p str>, PathError> {
        if path.is_empty() {
            return Err(PathError::invalid(path, InvalidKeyReason::Empty));
        }

        let segments: Vec<_> = path.split(self.delimiter.as_str()).collect();
        if let Some(position) = segments.iter().position(|segment| segment.is_empty()) {
            return Err(PathError::invalid(
                path,
                InvalidKeyReason::EmptySegment { position },
            ));
        }

        Ok(segments)
    }

    pub fn get<'d>(&self, path: &str, document: &'d Value) -> Result<&'d Value, PathError> {
        let segments = self.segments(path)?;

        let mut current = document;
        for segment in segments {
            tracing::trace!(path, segment, "walk");
            current = match current {
                Value::Object(object) => object.get(segment),
                Value::Array(items) => items.get(index(path, segment)?),
                _ => None,
            }
            .ok_or_else(|| PathError::not_found(path, segment))?;
        }

        Ok(current)
    }

    /// Sets the value at `path`, returning the number of values written
    ///
    /// An existing leaf is overwritten in place. A missing one is only created when `create`
    /// is set, together with any missing intermediate objects. Arrays are never grown and
    /// scalars are never replaced by objects to make room: both are [PathError::KeyNotFound].
    ///
    /// The document is left untouched when an error is returned.
    pub fn set(
        &self,
        path: &str,
        value: Value,
        document: &mut Value,
        create: bool,
    ) -> Result<usize, PathError> {
        let segments = self.segments(path)?;
        let (leaf, parents) = segments
            .split_last()
            .ok_or_else(|| PathError::invalid(path, InvalidKeyReason::Empty))?;

        // once an object got created every following step lands in a fresh object,
        // so nothing past that point can fail
        let mut current = document;
        for segment in parents {
            current = match current {
                Value::Object(object) => {
                    if create {
                        object
                            .entry(segment.to_string())
                            .or_insert_with(Value::empty_object)
                    } else {
                        object
                            .get_mut(*segment)
                            .ok_or_else(|| PathError::not_found(path, segment))?
                    }
                }
                Value::Array(items) => items
                    .get_mut(index(path, segment)?)
                    .ok_or_else(|| PathError::not_found(path, segment))?,
                _ => return Err(PathError::not_found(path, segment)),
            };
        }

        match current {
            Value::Object(object) => {
                if let Some(existing) = object.get_mut(*leaf) {
                    *existing = value;
                } else if create {
                    object.insert(leaf.to_string(), value);
                } else {
                    return Err(PathError::not_found(path, leaf));
                }
            }
            Value::Array(items) => {
                let existing = items
                    .get_mut(index(path, leaf)?)
                    .ok_or_else(|| PathError::not_found(path, leaf))?;
                *existing = value;
            }
            _ => return Err(PathError::not_found(path, leaf)),
        }

        Ok(1)
    }

    /// Removes the entry at `path`
    ///
    /// Remaining object keys keep their order, array elements after the index move down.
    pub fn remove(&self, path: &str, document: &mut Value) -> Result<bool, PathError> {
        let segments = self.segments(path)?;
        let (leaf, parents) = segments
            .split_last()
            .ok_or_else(|| PathError::invalid(path, InvalidKeyReason::Empty))?;

        let mut current = document;
        for segment in parents {
            current = match current {
                Value::Object(object) => object.get_mut(*segment),
                Value::Array(items) => items.get_mut(index(path, segment)?),
                _ => None,
            }
            .ok_or_else(|| PathError::not_found(path, segment))?;
        }

        match current {
            Value::Object(object) => object
                .shift_remove(*leaf)
                .ok_or_else(|| PathError::not_found(path, leaf))?,
            Value::Array(items) => {
                let index = index(path, leaf)?;
                if index >= items.len() {
                    return Err(PathError::not_found(path, leaf));
                }
                items.remove(index)
            }
            _ => return Err(PathError::not_found(path, leaf)),
        };

        Ok(true)
    }

    /// Whether [PathResolver::get] would succeed, malformed paths included
    pub fn exists(&self, path: &str, document: &Value) -> bool {
        self.get(path, document).is_ok()
    }
}

fn index(path: &str, segment: &str) -> Result<usize, PathError> {
    segment.parse().map_err(|_| {
        PathError::invalid(
            path,
            InvalidKeyReason::NotAnIndex {
                segment: segment.to_string(),
            },
        )
    })
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path is malformed or does not fit the document shape
    #[error("invalid key {path:?}: {reason}")]
    InvalidKey {
        path: String,
        reason: InvalidKeyReason,
    },
    /// The path is well-formed but the document has no entry for it
    #[error("key {segment:?} of {path:?} not found")]
    KeyNotFound { path: String, segment: String },
}

impl PathError {
    fn invalid(path: &str, reason: InvalidKeyReason) -> Self {
        PathError::InvalidKey {
            path: path.to_string(),
            reason,
        }
    }

    fn not_found(path: &str, segment: &str) -> Self {
        PathError::KeyNotFound {
            path: path.to_string(),
            segment: segment.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PathError::KeyNotFound { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidKeyReason {
    Empty,
    EmptySegment { position: usize },
    NotAnIndex { segment: String },
}

impl std::fmt::Display for InvalidKeyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidKeyReason::Empty => f.write_str("path is empty"),
            InvalidKeyReason::EmptySegment { position } => {
                write!(f, "segment {position} is empty")
            }
            InvalidKeyReason::NotAnIndex { segment } => {
                write!(f, "{segment:?} is not an array index")
            }
        }
    }
}
