//! Error types.
//!
//! [`ValidationError`] reports why an input was rejected. [`SchemaError`] and
//! [`SchemaErrors`] report why a schema itself is malformed.

mod schema_error;
mod validation_error;

pub use schema_error::{SchemaError, SchemaErrors};
pub use validation_error::{ErrorKey, ErrorKind, ValidationError};
