//! Schemas and their building blocks.
//!
//! A [`Schema`] maps key names to [`KeySpec`]s. Schemas are built once, checked
//! with [`Schema::compile`], and the resulting [`CompiledSchema`] is reused for
//! any number of validations.
//!
//! # Example
//!
//! ```rust
//! use optspec::{KeySpec, Schema, Type, Value};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .key("url", KeySpec::new(Type::String).required())
//!     .key("connections", KeySpec::new(Type::NonNegInteger).default(5))
//!     .compile()
//!     .unwrap();
//!
//! let output = schema.validate(&Value::from(json!({"url": "https://example.com"}))).unwrap();
//! assert_eq!(output.get("connections"), Some(&Value::Integer(5)));
//! ```

mod compiled;
mod key_spec;
mod meta;
mod normalize;
mod types;

use indexmap::IndexMap;

use crate::error::SchemaErrors;
use crate::value::Value;

pub use compiled::CompiledSchema;
pub use key_spec::{KeySpec, Keys};
pub use meta::validate_schema;
pub use normalize::normalize;
pub use types::{Choices, CustomValidator, Type};

pub(crate) use meta::from_value;
pub(crate) use normalize::resolve_keys;

/// The key name whose spec applies to every key present in the input.
pub const WILDCARD: &str = "*";

/// An ordered mapping from key names to key specifications.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    keys: IndexMap<String, KeySpec>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key. A later spec for the same name replaces the earlier one.
    pub fn key(mut self, name: impl Into<String>, spec: KeySpec) -> Self {
        self.keys.insert(name.into(), spec);
        self
    }

    /// Adds a spec applied to every key present in the input.
    pub fn wildcard(self, spec: KeySpec) -> Self {
        self.key(WILDCARD, spec)
    }

    pub fn get(&self, name: &str) -> Option<&KeySpec> {
        self.keys.get(name)
    }

    /// Returns the wildcard spec, if any.
    pub fn wildcard_spec(&self) -> Option<&KeySpec> {
        self.keys.get(WILDCARD)
    }

    /// Iterates keys in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeySpec)> {
        self.keys.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Returns the key names in declaration order.
    pub fn key_names(&self) -> Vec<&str> {
        self.keys.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Collects the names of registry schemas this schema references.
    pub fn collect_refs(&self, refs: &mut Vec<String>) {
        for spec in self.keys.values() {
            spec.collect_refs(refs);
        }
    }

    /// Checks this schema's definition and returns it, compiled, if it is
    /// well formed.
    ///
    /// # Errors
    ///
    /// Returns every definition problem found, see [`validate_schema`].
    pub fn compile(self) -> Result<CompiledSchema, SchemaErrors> {
        validate_schema(self)
    }

    /// Parses and compiles a data-described schema.
    ///
    /// Custom validators named in `raw` cannot be resolved without a
    /// registry; use [`Registry::compile`](crate::Registry::compile) for those.
    ///
    /// # Example
    ///
    /// ```rust
    /// use optspec::{Schema, Value};
    /// use serde_json::json;
    ///
    /// let raw = Value::from(json!({
    ///     "url": {"type": "string", "required": true},
    ///     "connections": {"type": "non_neg_integer", "default": 5}
    /// }));
    ///
    /// let schema = Schema::from_value(&raw).unwrap();
    /// assert_eq!(schema.key_names(), vec!["url", "connections"]);
    /// ```
    pub fn from_value(raw: &Value) -> Result<CompiledSchema, SchemaErrors> {
        from_value(raw, None)
    }
}

impl<S: Into<String>> FromIterator<(S, KeySpec)> for Schema {
    fn from_iter<I: IntoIterator<Item = (S, KeySpec)>>(iter: I) -> Self {
        Self {
            keys: iter
                .into_iter()
                .map(|(name, spec)| (name.into(), spec))
                .collect(),
        }
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Schema>();
    assert_sync::<Schema>();
};
