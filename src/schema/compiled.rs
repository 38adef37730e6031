//! Checked schemas, ready to validate input.

use std::ops::Deref;
use std::sync::Arc;

use rayon::prelude::*;

use crate::engine;
use crate::error::ValidationError;
use crate::validation::ValidationContext;
use crate::value::Value;

use super::Schema;

/// A schema whose definition passed [`validate_schema`](super::validate_schema).
///
/// Only compiled schemas validate input. A schema that would fail at data
/// time because of its own definition is rejected while compiling instead.
/// The builder API stays on [`Schema`]; a compiled schema reads through to
/// it. Cloning is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema(Arc<Schema>);

impl CompiledSchema {
    /// Wraps a schema the caller has already checked.
    pub(crate) fn new(schema: Schema) -> Self {
        Self(Arc::new(schema))
    }

    pub fn schema(&self) -> &Schema {
        &self.0
    }

    pub(crate) fn shared(&self) -> Arc<Schema> {
        Arc::clone(&self.0)
    }

    /// Returns the underlying schema, to extend it and compile again.
    pub fn into_schema(self) -> Schema {
        Arc::try_unwrap(self.0).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Validates `input` against this schema.
    ///
    /// Returns the normalized value: defaults applied, nested values
    /// validated. The first violation in declaration order is returned as
    /// the error.
    pub fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        self.validate_with(input, &ValidationContext::new())
    }

    /// Validates `input` with an explicit context (registry, depth limit).
    pub fn validate_with(
        &self,
        input: &Value,
        ctx: &ValidationContext,
    ) -> Result<Value, ValidationError> {
        engine::walk_value(input, &self.0, ctx)
    }

    /// Validates many inputs in parallel, returning results in input order.
    pub fn validate_all(&self, inputs: &[Value]) -> Vec<Result<Value, ValidationError>> {
        let ctx = ValidationContext::new();
        self.validate_all_with(inputs, &ctx)
    }

    /// Validates many inputs in parallel with an explicit context.
    pub fn validate_all_with(
        &self,
        inputs: &[Value],
        ctx: &ValidationContext,
    ) -> Vec<Result<Value, ValidationError>> {
        inputs
            .par_iter()
            .map(|input| self.validate_with(input, ctx))
            .collect()
    }
}

impl Deref for CompiledSchema {
    type Target = Schema;

    fn deref(&self) -> &Schema {
        &self.0
    }
}

impl AsRef<Schema> for CompiledSchema {
    fn as_ref(&self) -> &Schema {
        &self.0
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<CompiledSchema>();
    assert_sync::<CompiledSchema>();
};
