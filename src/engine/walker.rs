//! Walking an input mapping against a schema.

use std::collections::HashMap;

use crate::error::{ErrorKey, ErrorKind, ValidationError};
use crate::path::PathSegment;
use crate::schema::{normalize, resolve_keys, Keys, Schema};
use crate::validation::ValidationContext;
use crate::value::{Keywords, Value};

use super::matcher::match_type;

/// Validates a keyword list or an identifier-keyed map against `schema`.
///
/// The output has the same shape as the input. Map keys present in the input
/// are kept as given; defaults are added under string keys.
pub(crate) fn walk_value(
    input: &Value,
    schema: &Schema,
    ctx: &ValidationContext,
) -> Result<Value, ValidationError> {
    match input {
        Value::Keywords(entries) => walk(entries, schema, ctx).map(Value::Keywords),
        Value::Map(map) => {
            if let Some(name) = input.duplicate_identifier() {
                return Err(ValidationError::new(
                    ErrorKind::Shape,
                    ErrorKey::Root,
                    format!(
                        "invalid input: key '{}' is given both as a string and as an atom, got: {}",
                        name, input
                    ),
                )
                .with_value(input.clone()));
            }
            let entries = input.entries().ok_or_else(|| not_a_mapping(input))?;
            let output = walk(&entries, schema, ctx)?;

            let original_keys: HashMap<&str, &Value> = map
                .keys()
                .filter_map(|k| k.as_identifier().map(|name| (name, k)))
                .collect();
            Ok(Value::Map(
                output
                    .into_iter()
                    .map(|(name, value)| {
                        let key = match original_keys.get(name.as_str()) {
                            Some(original) => (*original).clone(),
                            None => Value::String(name),
                        };
                        (key, value)
                    })
                    .collect(),
            ))
        }
        other => Err(not_a_mapping(other)),
    }
}

/// Validates the entries of one schema level.
///
/// Keys are processed in schema order and the first failure is returned.
pub(crate) fn walk(
    input: &Keywords,
    schema: &Schema,
    ctx: &ValidationContext,
) -> Result<Keywords, ValidationError> {
    let schema = normalize(schema, input.keys().map(String::as_str));

    let unknown: Vec<String> = input
        .keys()
        .filter(|name| schema.get(name).is_none())
        .cloned()
        .collect();
    if !unknown.is_empty() {
        let message = format!(
            "unknown keys {}, valid keys are: {}",
            ErrorKey::Unknown(unknown.clone()),
            render_names(schema.key_names()),
        );
        return Err(ValidationError::new(
            ErrorKind::UnknownKeys,
            ErrorKey::Unknown(unknown),
            message,
        ));
    }

    let mut output = Keywords::with_capacity(schema.len());
    for (name, spec) in schema.iter() {
        let key = ErrorKey::Key(name.to_string());

        let value = match input.get(name) {
            Some(value) => {
                if let Some(message) = spec.deprecation() {
                    tracing::warn!(
                        key = %ctx.path().push_key(name),
                        "'{}' is deprecated. {}",
                        name,
                        message
                    );
                }
                value
            }
            None if spec.is_required() => {
                return Err(ValidationError::new(
                    ErrorKind::Presence,
                    key.clone(),
                    format!(
                        "required key {} not found, received keys: {}",
                        key,
                        render_names(input.keys().map(String::as_str)),
                    ),
                ));
            }
            None => match spec.default_value() {
                Some(default) => default,
                None => continue,
            },
        };

        let matched = match_type(spec.ty(), &key, value, ctx)?;
        let matched = match spec.nested() {
            Some(keys) => descend(&matched, keys, &key, ctx)?,
            None => matched,
        };
        output.insert(name.to_string(), matched);
    }

    Ok(output)
}

/// Walks a matched container value against its nested schema.
///
/// A list is walked element by element. Failures inside the nested schema
/// come back with the segment for `key` prepended to their path.
pub(crate) fn descend(
    value: &Value,
    keys: &Keys,
    key: &ErrorKey,
    ctx: &ValidationContext,
) -> Result<Value, ValidationError> {
    if ctx.at_depth_limit() {
        return Err(ValidationError::new(
            ErrorKind::DepthLimit,
            key.clone(),
            format!(
                "maximum nesting depth of {} exceeded at {}",
                ctx.max_depth(),
                key
            ),
        ));
    }

    let schema = resolve_keys(keys, key, ctx)?;
    let inner = ctx.descend(key.segment());

    let walked = match value {
        Value::List(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                walk_value(item, &schema, &inner.at(PathSegment::Index(index)))
                    .map_err(|err| err.nest(PathSegment::Index(index)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        _ => walk_value(value, &schema, &inner),
    };

    walked.map_err(|err| err.nest(key.segment()))
}

fn not_a_mapping(value: &Value) -> ValidationError {
    ValidationError::new(
        ErrorKind::Shape,
        ErrorKey::Root,
        format!(
            "invalid input: expected a keyword list or a map with identifier keys, got: {}",
            value
        ),
    )
    .with_value(value.clone())
}

fn render_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let names: Vec<&str> = names.into_iter().collect();
    format!("[{}]", names.join(", "))
}
