//! Wildcard expansion and nested schema resolution.

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::{ErrorKey, ErrorKind, ValidationError};
use crate::validation::ValidationContext;

use super::{Keys, Schema, WILDCARD};

/// Expands a wildcard entry against the keys present in an input.
///
/// A schema without a wildcard is returned borrowed. Otherwise the result
/// holds every named key in declaration order, followed by each observed key
/// that has no named entry, mapped to the wildcard spec. Named keys win over
/// the wildcard for the same name.
///
/// # Example
///
/// ```rust
/// use optspec::{normalize, KeySpec, Schema, Type};
///
/// let schema = Schema::new()
///     .key("name", KeySpec::new(Type::String).required())
///     .wildcard(KeySpec::new(Type::Integer));
///
/// let concrete = normalize(&schema, ["x", "name", "y"]);
/// assert_eq!(concrete.key_names(), vec!["name", "x", "y"]);
/// ```
pub fn normalize<'s, 'k>(
    schema: &'s Schema,
    observed: impl IntoIterator<Item = &'k str>,
) -> Cow<'s, Schema> {
    let Some(wildcard) = schema.wildcard_spec() else {
        return Cow::Borrowed(schema);
    };

    let named = schema
        .iter()
        .filter(|(name, _)| *name != WILDCARD)
        .map(|(name, spec)| (name.to_string(), spec.clone()));

    let expanded: Vec<(String, _)> = observed
        .into_iter()
        .filter(|name| *name == WILDCARD || schema.get(name).is_none())
        .map(|name| (name.to_string(), wildcard.clone()))
        .collect();

    Cow::Owned(named.chain(expanded).collect())
}

/// Produces the nested schema a `keys` attribute stands for.
///
/// Lazy producers are invoked once per call. Named references are looked up
/// in the context's registry.
pub(crate) fn resolve_keys(
    keys: &Keys,
    key: &ErrorKey,
    ctx: &ValidationContext,
) -> Result<Arc<Schema>, ValidationError> {
    match keys {
        Keys::Inline(schema) => Ok(Arc::clone(schema)),
        Keys::Lazy(producer) => Ok(Arc::new(producer())),
        Keys::Ref(name) => ctx
            .registry()
            .and_then(|registry| registry.schema(name))
            .map(|compiled| compiled.shared())
            .ok_or_else(|| {
                ValidationError::new(
                    ErrorKind::UnresolvedReference,
                    key.clone(),
                    format!("schema '{}' referenced by {} is not registered", name, key),
                )
            }),
    }
}
