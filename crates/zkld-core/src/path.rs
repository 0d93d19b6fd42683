//! # Path addressing and the path locator
//!
//! Edits discovered while walking one tree (the original credential) are
//! replayed onto a structurally parallel but distinct tree (the disclosed
//! credential). Holding live references into either tree is impossible
//! across that boundary, so edits are keyed by a [`JsonPath`]: the sequence
//! of object keys and array indices leading from the root to a node.
//!
//! [`locate_mut`] resolves a path to a [`NodeHandle`], a mutable view of the
//! addressed object that can read and overwrite `@id` / `@value` / `@type`
//! and delete fields. Resolution is side-effect free.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::PathError;
use crate::keyword;

/// One step in a [`JsonPath`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// An object key.
    Key(String),
    /// An array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "[{key:?}]"),
            Self::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// An ordered sequence of keys and indices addressing a node in a tree.
///
/// Paths order lexicographically by segment, which makes edit maps keyed by
/// path iterate deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsonPath(Vec<PathSegment>);

impl JsonPath {
    /// The empty path, addressing the tree root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// The path's segments from the root.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a segment.
    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    /// A new path extended by an object key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.push(PathSegment::Key(key.into()));
        next
    }

    /// A new path extended by an array index.
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.push(PathSegment::Index(index));
        next
    }

    /// The first `len` segments of this path.
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }
}

impl From<Vec<PathSegment>> for JsonPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for JsonPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Resolve `path` against `tree` for reading.
pub fn locate<'a>(tree: &'a Value, path: &JsonPath) -> Result<&'a Value, PathError> {
    let mut current = tree;
    for (depth, segment) in path.segments().iter().enumerate() {
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => {
                map.get(key).ok_or_else(|| PathError::MissingKey {
                    path: path.prefix(depth),
                    key: key.clone(),
                })?
            }
            (PathSegment::Index(index), Value::Array(items)) => {
                items.get(*index).ok_or_else(|| PathError::IndexOutOfBounds {
                    path: path.prefix(depth),
                    index: *index,
                    len: items.len(),
                })?
            }
            (PathSegment::Key(_), _) => {
                return Err(PathError::NotAnObject {
                    path: path.prefix(depth),
                })
            }
            (PathSegment::Index(_), _) => {
                return Err(PathError::NotAnArray {
                    path: path.prefix(depth),
                })
            }
        };
    }
    Ok(current)
}

/// Resolve `path` against `tree` to a mutable handle on the addressed object.
///
/// Fails with [`PathError`] when a segment is absent, an index is out of
/// range, a segment is applied to a value of the wrong shape, or the
/// addressed value is not an object.
pub fn locate_mut<'a>(tree: &'a mut Value, path: &JsonPath) -> Result<NodeHandle<'a>, PathError> {
    let mut current = tree;
    for (depth, segment) in path.segments().iter().enumerate() {
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => match map.get_mut(key) {
                Some(child) => child,
                None => {
                    return Err(PathError::MissingKey {
                        path: path.prefix(depth),
                        key: key.clone(),
                    })
                }
            },
            (PathSegment::Index(index), Value::Array(items)) => {
                let len = items.len();
                match items.get_mut(*index) {
                    Some(child) => child,
                    None => {
                        return Err(PathError::IndexOutOfBounds {
                            path: path.prefix(depth),
                            index: *index,
                            len,
                        })
                    }
                }
            }
            (PathSegment::Key(_), _) => {
                return Err(PathError::NotAnObject {
                    path: path.prefix(depth),
                })
            }
            (PathSegment::Index(_), _) => {
                return Err(PathError::NotAnArray {
                    path: path.prefix(depth),
                })
            }
        };
    }
    match current {
        Value::Object(map) => Ok(NodeHandle { map }),
        _ => Err(PathError::NotAnObject { path: path.clone() }),
    }
}

/// Mutable view of one object node inside a tree.
#[derive(Debug)]
pub struct NodeHandle<'a> {
    map: &'a mut Map<String, Value>,
}

impl NodeHandle<'_> {
    /// The node's `@id`, if it is a string.
    pub fn id(&self) -> Option<&str> {
        self.map.get(keyword::ID).and_then(Value::as_str)
    }

    /// Overwrite the node's `@id`.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.map
            .insert(keyword::ID.to_string(), Value::String(id.into()));
    }

    /// The node's raw `@value`.
    pub fn value(&self) -> Option<&Value> {
        self.map.get(keyword::VALUE)
    }

    /// The node's raw `@type` (a datatype IRI on value objects).
    pub fn literal_type(&self) -> Option<&Value> {
        self.map.get(keyword::TYPE)
    }

    /// Any field of the node.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Delete a field, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key)
    }
}
