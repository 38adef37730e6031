//! Schema definition error types.
//!
//! This module provides [`SchemaError`] for a single problem found while
//! compiling a schema and [`SchemaErrors`] for accumulating all of them.
//! These are distinct from [`ValidationError`](crate::ValidationError): a
//! schema error means the schema is broken, not that the input is bad.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::path::KeyPath;

/// A single schema definition problem with full context.
///
/// - **path**: Which key of the schema (possibly nested) is malformed
/// - **message**: Human-readable description of the problem
/// - **code**: Machine-readable error code for programmatic handling
///
/// # Example
///
/// ```rust
/// use optspec::{KeyPath, SchemaError};
///
/// let error = SchemaError::new(KeyPath::from_key("pool"), "unknown type :pool_size")
///     .with_code("unknown_type");
///
/// assert_eq!(error.code, "unknown_type");
/// assert_eq!(error.to_string(), "pool: unknown type :pool_size");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    /// The schema key the problem was found at.
    pub path: KeyPath,
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable error code (e.g., `invalid_default`).
    pub code: String,
}

impl SchemaError {
    /// Creates a new schema error with the given path and message.
    ///
    /// The error code defaults to "invalid_schema". Use `with_code` to set
    /// a more specific code.
    pub fn new(path: KeyPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            code: "invalid_schema".to_string(),
        }
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(schema): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for SchemaError {}

/// A non-empty collection of schema definition errors.
///
/// `SchemaErrors` wraps a `NonEmptyVec<SchemaError>`, so a failed compilation
/// always reports at least one problem. It implements `Semigroup`, allowing
/// the errors of independent keys to be combined:
///
/// ```rust
/// use optspec::{KeyPath, SchemaError, SchemaErrors};
/// use stillwater::prelude::*;
///
/// let a = SchemaErrors::single(SchemaError::new(KeyPath::from_key("a"), "unknown type :x"));
/// let b = SchemaErrors::single(SchemaError::new(KeyPath::from_key("b"), "empty or"));
///
/// assert_eq!(a.combine(b).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaErrors(NonEmptyVec<SchemaError>);

impl SchemaErrors {
    /// Creates a `SchemaErrors` containing a single error.
    pub fn single(error: SchemaError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a `SchemaErrors` from a `Vec<SchemaError>`, or `None` if the
    /// vec is empty.
    pub fn from_vec(errors: Vec<SchemaError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: the collection is guaranteed non-empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaError> {
        self.0.iter()
    }

    /// Returns all errors at the specified schema path.
    pub fn at_path(&self, path: &KeyPath) -> Vec<&SchemaError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Returns all errors with the specified error code.
    pub fn with_code(&self, code: &str) -> Vec<&SchemaError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Returns the first error in the collection.
    pub fn first(&self) -> &SchemaError {
        self.0.head()
    }

    /// Converts this collection into a `Vec<SchemaError>`.
    pub fn into_vec(self) -> Vec<SchemaError> {
        self.0.into_vec()
    }
}

impl Semigroup for SchemaErrors {
    fn combine(self, other: Self) -> Self {
        SchemaErrors(self.0.combine(other.0))
    }
}

impl Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "invalid schema, {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

impl IntoIterator for SchemaErrors {
    type Item = SchemaError;
    type IntoIter = std::vec::IntoIter<SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<SchemaErrors>();
    assert_sync::<SchemaErrors>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_creation() {
        let error = SchemaError::new(KeyPath::from_key("pool"), "keys not allowed");

        assert_eq!(error.path, KeyPath::from_key("pool"));
        assert_eq!(error.message, "keys not allowed");
        assert_eq!(error.code, "invalid_schema");
    }

    #[test]
    fn test_schema_error_display_root() {
        let error = SchemaError::new(KeyPath::root(), "expected a keyword list or map");
        assert_eq!(error.to_string(), "(schema): expected a keyword list or map");
    }

    #[test]
    fn test_from_vec() {
        assert!(SchemaErrors::from_vec(Vec::new()).is_none());

        let errors = SchemaErrors::from_vec(vec![
            SchemaError::new(KeyPath::from_key("a"), "one"),
            SchemaError::new(KeyPath::from_key("b"), "two"),
        ])
        .unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first().message, "one");
    }

    #[test]
    fn test_query_by_path_and_code() {
        let path_a = KeyPath::from_key("a");
        let errors = SchemaErrors::single(
            SchemaError::new(path_a.clone(), "bad default").with_code("invalid_default"),
        )
        .combine(SchemaErrors::single(
            SchemaError::new(path_a.clone(), "empty or").with_code("empty_or"),
        ))
        .combine(SchemaErrors::single(
            SchemaError::new(KeyPath::from_key("b"), "bad default").with_code("invalid_default"),
        ));

        assert_eq!(errors.at_path(&path_a).len(), 2);
        assert_eq!(errors.with_code("invalid_default").len(), 2);
        assert_eq!(errors.with_code("missing").len(), 0);
    }

    #[test]
    fn test_display_lists_every_error() {
        let errors = SchemaErrors::single(SchemaError::new(KeyPath::from_key("a"), "one"))
            .combine(SchemaErrors::single(SchemaError::new(
                KeyPath::from_key("b"),
                "two",
            )));

        let display = errors.to_string();
        assert!(display.contains("2 error(s)"));
        assert!(display.contains("1. a: one"));
        assert!(display.contains("2. b: two"));
    }

    #[test]
    fn test_semigroup_associativity() {
        let e1 = SchemaErrors::single(SchemaError::new(KeyPath::root(), "1"));
        let e2 = SchemaErrors::single(SchemaError::new(KeyPath::root(), "2"));
        let e3 = SchemaErrors::single(SchemaError::new(KeyPath::root(), "3"));

        let left = e1.clone().combine(e2.clone()).combine(e3.clone());
        let right = e1.combine(e2.combine(e3));

        let left_msgs: Vec<_> = left.iter().map(|e| &e.message).collect();
        let right_msgs: Vec<_> = right.iter().map(|e| &e.message).collect();
        assert_eq!(left_msgs, right_msgs);
    }
}
