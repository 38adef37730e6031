//! Key path representation for locating values in nested options.
//!
//! This module provides [`KeyPath`] and [`PathSegment`]. A validation error's
//! path lists the keys enclosing the failure, outermost first. Paths grow at
//! the front as an error unwinds out of nested schemas.

use std::collections::VecDeque;
use std::fmt::{self, Display};

/// A segment of a key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named key (e.g., `producer`, `rate_limiting`)
    Key(String),
    /// A list position (e.g., `[0]`)
    Index(usize),
}

impl PathSegment {
    /// Creates a new key segment.
    pub fn key(name: impl Into<String>) -> Self {
        PathSegment::Key(name.into())
    }

    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// A path to a value in nested options.
///
/// # Example
///
/// ```rust
/// use optspec::{KeyPath, PathSegment};
///
/// let path = KeyPath::root()
///     .push_key("producer")
///     .push_index(0)
///     .push_key("concurrency");
/// assert_eq!(path.to_string(), "producer[0].concurrency");
///
/// let outer = path.prepend(PathSegment::key("pipeline"));
/// assert_eq!(outer.to_string(), "pipeline.producer[0].concurrency");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath {
    segments: VecDeque<PathSegment>,
}

impl KeyPath {
    /// Creates an empty path representing the top-level input.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from a single key segment.
    pub fn from_key(name: impl Into<String>) -> Self {
        Self::root().push_key(name)
    }

    /// Returns a new path with a key segment appended.
    pub fn push_key(&self, name: impl Into<String>) -> Self {
        self.push(PathSegment::Key(name.into()))
    }

    /// Returns a new path with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        self.push(PathSegment::Index(index))
    }

    /// Returns a new path with `segment` appended.
    pub fn push(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push_back(segment);
        Self { segments }
    }

    /// Returns a new path with `segment` in front of the existing segments.
    pub fn prepend(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push_front(segment);
        Self { segments }
    }

    /// Returns a new path made of `self` followed by every segment of `other`.
    pub fn join(&self, other: &KeyPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Returns true if this is the root path (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the outermost segment, or None if this is root.
    pub fn first(&self) -> Option<&PathSegment> {
        self.segments.front()
    }

    /// Returns the innermost segment, or None if this is root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.back()
    }
}

impl FromIterator<PathSegment> for KeyPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}
