//! Per-key specifications.

use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::value::Value;

use super::{Schema, Type};

type SchemaProducer = Arc<dyn Fn() -> Schema + Send + Sync>;

/// The nested schema of a container key.
#[derive(Clone)]
pub enum Keys {
    /// A schema stored in place.
    Inline(Arc<Schema>),
    /// A producer invoked each time the nested schema is needed, for
    /// self-referential schemas.
    Lazy(SchemaProducer),
    /// A schema registered under a name in a [`Registry`](crate::Registry).
    Ref(String),
}

impl Keys {
    /// Creates a lazily produced nested schema.
    pub fn lazy<F>(producer: F) -> Self
    where
        F: Fn() -> Schema + Send + Sync + 'static,
    {
        Keys::Lazy(Arc::new(producer))
    }

    /// Collects registry references reachable without invoking producers.
    pub fn collect_refs(&self, refs: &mut Vec<String>) {
        match self {
            Keys::Inline(schema) => schema.collect_refs(refs),
            Keys::Lazy(_) => {}
            Keys::Ref(name) => refs.push(name.clone()),
        }
    }
}

impl From<Schema> for Keys {
    fn from(schema: Schema) -> Self {
        Keys::Inline(Arc::new(schema))
    }
}

impl PartialEq for Keys {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Keys::Inline(a), Keys::Inline(b)) => a == b,
            (Keys::Lazy(a), Keys::Lazy(b)) => Arc::ptr_eq(a, b),
            (Keys::Ref(a), Keys::Ref(b)) => a == b,
            _ => false,
        }
    }
}

impl Debug for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keys::Inline(schema) => f.debug_tuple("Inline").field(schema).finish(),
            Keys::Lazy(_) => f.write_str("Lazy(..)"),
            Keys::Ref(name) => f.debug_tuple("Ref").field(name).finish(),
        }
    }
}

/// The specification of a single schema key.
///
/// # Example
///
/// ```rust
/// use optspec::{KeySpec, Type, Value};
///
/// let spec = KeySpec::new(Type::NonNegInteger)
///     .default(Value::Integer(5))
///     .doc("Size of the connection pool");
///
/// assert!(!spec.is_required());
/// assert_eq!(spec.default_value(), Some(&Value::Integer(5)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KeySpec {
    ty: Type,
    required: bool,
    default: Option<Value>,
    keys: Option<Keys>,
    deprecated: Option<String>,
    doc: Option<String>,
    subsection: Option<String>,
    type_doc: Option<String>,
}

impl KeySpec {
    /// Creates an optional key of the given type.
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            required: false,
            default: None,
            keys: None,
            deprecated: None,
            doc: None,
            subsection: None,
            type_doc: None,
        }
    }

    /// Creates an optional key accepting any value.
    pub fn any() -> Self {
        Self::new(Type::Any)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the value used when the key is absent.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the nested schema of a container key.
    pub fn keys(mut self, schema: Schema) -> Self {
        self.keys = Some(Keys::from(schema));
        self
    }

    /// Sets a nested schema produced on demand.
    pub fn lazy_keys<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Schema + Send + Sync + 'static,
    {
        self.keys = Some(Keys::lazy(producer));
        self
    }

    /// Sets a nested schema resolved by name from the registry.
    pub fn keys_ref(mut self, name: impl Into<String>) -> Self {
        self.keys = Some(Keys::Ref(name.into()));
        self
    }

    pub(crate) fn with_keys(mut self, keys: Keys) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Marks the key deprecated; supplying it logs `message` as a warning.
    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecated = Some(message.into());
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn subsection(mut self, subsection: impl Into<String>) -> Self {
        self.subsection = Some(subsection.into());
        self
    }

    pub fn type_doc(mut self, type_doc: impl Into<String>) -> Self {
        self.type_doc = Some(type_doc.into());
        self
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn nested(&self) -> Option<&Keys> {
        self.keys.as_ref()
    }

    pub fn deprecation(&self) -> Option<&str> {
        self.deprecated.as_deref()
    }

    pub fn doc_text(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn subsection_text(&self) -> Option<&str> {
        self.subsection.as_deref()
    }

    pub fn type_doc_text(&self) -> Option<&str> {
        self.type_doc.as_deref()
    }

    pub(crate) fn collect_refs(&self, refs: &mut Vec<String>) {
        self.ty.collect_refs(refs);
        if let Some(keys) = &self.keys {
            keys.collect_refs(refs);
        }
    }
}
