//! Registry of named schemas and custom validators.
//!
//! This module provides the [`Registry`] type that stores named schemas for
//! `keys` references and named validators for `custom` types in raw schemas.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{SchemaErrors, ValidationError};
use crate::schema::{validate_schema, CompiledSchema, CustomValidator, Schema};
use crate::validation::{ValidationContext, DEFAULT_MAX_DEPTH};
use crate::value::Value;

/// Type alias for the schema storage map.
type SchemaMap = Arc<RwLock<HashMap<String, CompiledSchema>>>;

/// Type alias for the validator storage map.
type ValidatorMap = Arc<RwLock<HashMap<String, CustomValidator>>>;

/// A thread-safe registry of named schemas and validators.
///
/// Cloning a registry is cheap: clones share the same storage.
///
/// # Thread Safety
///
/// The registry uses `Arc<RwLock<...>>` for thread-safe access:
/// - Multiple threads can validate concurrently (read-only access)
/// - Registration operations are serialized (write access)
///
/// # Example
///
/// ```rust
/// use optspec::{KeySpec, Registry, Schema, Type, Value};
/// use serde_json::json;
///
/// let registry = Registry::new();
/// registry
///     .register_schema(
///         "Node",
///         Schema::new()
///             .key("name", KeySpec::new(Type::String).required())
///             .key("children", KeySpec::new(Type::list_of(Type::Map)).keys_ref("Node")),
///     )
///     .unwrap();
///
/// let tree = Value::from(json!({"name": "root", "children": [{"name": "leaf"}]}));
/// assert!(registry.validate("Node", &tree).unwrap().is_ok());
/// ```
#[derive(Clone)]
pub struct Registry {
    schemas: SchemaMap,
    validators: ValidatorMap,
    max_depth: usize,
}

impl Registry {
    /// Creates a new empty registry with default max depth (100).
    pub fn new() -> Self {
        Self {
            schemas: Arc::new(RwLock::new(HashMap::new())),
            validators: Arc::new(RwLock::new(HashMap::new())),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum nesting depth for validations run through the
    /// registry.
    ///
    /// When a self-referential schema nests deeper than this, validation
    /// fails with a depth-limit error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use optspec::Registry;
    ///
    /// let registry = Registry::new().with_max_depth(50);
    /// assert_eq!(registry.max_depth(), 50);
    /// ```
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Compiles and registers a schema under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateSchema` if the name is taken and
    /// `RegistryError::InvalidSchema` if the schema does not compile.
    pub fn register_schema(
        &self,
        name: impl Into<String>,
        schema: Schema,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.schemas.read().contains_key(&name) {
            return Err(RegistryError::DuplicateSchema(name));
        }

        let schema = validate_schema(schema).map_err(|errors| RegistryError::InvalidSchema {
            name: name.clone(),
            errors,
        })?;

        let mut schemas = self.schemas.write();
        if schemas.contains_key(&name) {
            return Err(RegistryError::DuplicateSchema(name));
        }
        tracing::debug!(schema = %name, keys = schema.len(), "registered schema");
        schemas.insert(name, schema);
        Ok(())
    }

    /// Registers a custom validator under its own name.
    ///
    /// Raw schemas refer to it as `{"custom": "<name>"}`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateValidator` if the name is taken.
    pub fn register_validator(&self, validator: CustomValidator) -> Result<(), RegistryError> {
        let mut validators = self.validators.write();
        let name = validator.name().to_string();
        if validators.contains_key(&name) {
            return Err(RegistryError::DuplicateValidator(name));
        }
        validators.insert(name, validator);
        Ok(())
    }

    /// Retrieves a compiled schema by name.
    pub fn schema(&self, name: &str) -> Option<CompiledSchema> {
        self.schemas.read().get(name).cloned()
    }

    /// Retrieves a validator by name.
    pub fn validator(&self, name: &str) -> Option<CustomValidator> {
        self.validators.read().get(name).cloned()
    }

    /// Parses and compiles a data-described schema, resolving named custom
    /// validators from this registry.
    ///
    /// # Example
    ///
    /// ```rust
    /// use optspec::{CustomValidator, Registry, Value};
    /// use serde_json::json;
    ///
    /// let registry = Registry::new();
    /// registry
    ///     .register_validator(CustomValidator::from_fn("lowercase", |v| match v {
    ///         Value::String(s) if s.chars().all(|c| !c.is_uppercase()) => Ok(v.clone()),
    ///         other => Err(format!("expected a lowercase string, got: {}", other)),
    ///     }))
    ///     .unwrap();
    ///
    /// let schema = registry
    ///     .compile(&Value::from(json!({"name": {"type": {"custom": "lowercase"}}})))
    ///     .unwrap();
    ///
    /// assert!(schema.validate(&Value::from(json!({"name": "abc"}))).is_ok());
    /// assert!(schema.validate(&Value::from(json!({"name": "Abc"}))).is_err());
    /// ```
    pub fn compile(&self, raw: &Value) -> Result<CompiledSchema, SchemaErrors> {
        crate::schema::from_value(raw, Some(self))
    }

    /// Returns the names referenced through `keys` that are not registered.
    ///
    /// Call this after all schemas are registered to check reference
    /// integrity.
    pub fn unresolved_refs(&self) -> Vec<String> {
        let schemas = self.schemas.read();
        let mut all_refs = Vec::new();

        for schema in schemas.values() {
            schema.collect_refs(&mut all_refs);
        }

        let mut unresolved: Vec<String> = all_refs
            .into_iter()
            .filter(|name| !schemas.contains_key(name))
            .collect();
        unresolved.sort();
        unresolved.dedup();
        unresolved
    }

    /// Returns a validation context that resolves references through this
    /// registry.
    pub fn context(&self) -> ValidationContext {
        ValidationContext::new()
            .with_registry(self.clone())
            .with_max_depth(self.max_depth)
    }

    /// Validates a value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SchemaNotFound` if the schema name doesn't
    /// exist. Validation failures are reported in the inner result.
    pub fn validate(
        &self,
        schema_name: &str,
        input: &Value,
    ) -> Result<Result<Value, ValidationError>, RegistryError> {
        let schema = self
            .schema(schema_name)
            .ok_or_else(|| RegistryError::SchemaNotFound(schema_name.to_string()))?;

        Ok(schema.validate_with(input, &self.context()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut schemas: Vec<String> = self.schemas.read().keys().cloned().collect();
        let mut validators: Vec<String> = self.validators.read().keys().cloned().collect();
        schemas.sort();
        validators.sort();
        f.debug_struct("Registry")
            .field("schemas", &schemas)
            .field("validators", &validators)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a schema with a name that already exists.
    #[error("schema '{0}' already registered")]
    DuplicateSchema(String),

    /// Attempted to register a validator with a name that already exists.
    #[error("validator '{0}' already registered")]
    DuplicateValidator(String),

    /// Attempted to validate with a schema name that doesn't exist.
    #[error("schema '{0}' not found")]
    SchemaNotFound(String),

    /// The schema failed to compile.
    #[error("schema '{name}' is invalid: {errors}")]
    InvalidSchema { name: String, errors: SchemaErrors },
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Registry>();
    assert_sync::<Registry>();
};
