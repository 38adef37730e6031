//! The validation engine: the type matcher and the structural walker.
//!
//! The two halves recurse into each other. The walker runs the matcher on
//! every key; the matcher calls back into the walker for containers that carry
//! a nested schema.

mod matcher;
mod walker;

pub(crate) use matcher::match_type;
pub(crate) use walker::{descend, walk_value};
