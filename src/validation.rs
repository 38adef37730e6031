//! Validation context for reference resolution and depth tracking.
//!
//! This module provides the [`ValidationContext`] type that carries an
//! optional registry, the current nesting depth and the path of the schema
//! level being walked. It lets named schemas be resolved and stops runaway
//! recursion through self-referential schemas.

use crate::path::{KeyPath, PathSegment};
use crate::registry::Registry;

/// Maximum nesting depth used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Per-call validation settings and position.
///
/// A context is cheap to clone; the registry shares its storage.
///
/// # Example
///
/// ```rust
/// use optspec::{Registry, ValidationContext};
///
/// let ctx = ValidationContext::new()
///     .with_registry(Registry::new())
///     .with_max_depth(16);
///
/// assert_eq!(ctx.max_depth(), 16);
/// assert_eq!(ctx.depth(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ValidationContext {
    registry: Option<Registry>,
    depth: usize,
    max_depth: usize,
    path: KeyPath,
}

impl ValidationContext {
    /// Creates a context with no registry and the default depth limit.
    pub fn new() -> Self {
        Self {
            registry: None,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            path: KeyPath::root(),
        }
    }

    /// Sets the registry used to resolve named nested schemas.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns a context one nesting level deeper, at `segment`.
    pub fn descend(&self, segment: PathSegment) -> Self {
        Self {
            registry: self.registry.clone(),
            depth: self.depth + 1,
            max_depth: self.max_depth,
            path: self.path.push(segment),
        }
    }

    /// Returns a context at `segment` of the same nesting level.
    pub fn at(&self, segment: PathSegment) -> Self {
        Self {
            registry: self.registry.clone(),
            depth: self.depth,
            max_depth: self.max_depth,
            path: self.path.push(segment),
        }
    }

    /// Returns true once another level of nesting would pass the limit.
    pub fn at_depth_limit(&self) -> bool {
        self.depth >= self.max_depth
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the path of the schema level being walked.
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    pub fn registry(&self) -> Option<&Registry> {
        self.registry.as_ref()
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new()
    }
}
