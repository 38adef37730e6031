//! Schema compilation.
//!
//! [`validate_schema`] checks a schema's own definition. [`from_value`] parses
//! a data-described schema: every raw key spec is first validated by the
//! engine against a key-spec schema, then turned into a [`KeySpec`].

use regex::Regex;
use stillwater::prelude::*;
use stillwater::Validation;

use crate::engine::{descend, match_type, walk_value};
use crate::error::{ErrorKey, ErrorKind, SchemaError, SchemaErrors, ValidationError};
use crate::path::KeyPath;
use crate::registry::Registry;
use crate::validation::ValidationContext;
use crate::value::Value;

use super::{Choices, CompiledSchema, CustomValidator, KeySpec, Keys, Schema, Type};

/// Checks a schema's definition and returns it if it is well formed.
///
/// Every problem is reported, not just the first:
/// - `keys` set on a type that cannot hold nested keys
/// - a keyed container used outside `or` and `list_of`, or around a
///   non-container type
/// - an `or` without alternatives, an empty integer range, an empty struct tag
/// - a default that does not match its key's type or nested keys
///
/// Nested inline schemas are checked recursively. A lazy producer is invoked
/// once and its schema checked, without expanding the lazy keys inside it.
/// The check is idempotent: compiling the schema of an accepted result again
/// gives an equal result.
///
/// # Example
///
/// ```rust
/// use optspec::{validate_schema, KeySpec, Schema, Type};
///
/// let schema = Schema::new()
///     .key("pool", KeySpec::new(Type::PosInteger).default(0))
///     .key("mode", KeySpec::new(Type::Or(vec![])));
///
/// let errors = validate_schema(schema).unwrap_err();
/// assert_eq!(errors.len(), 2);
/// assert_eq!(errors.with_code("invalid_default").len(), 1);
/// ```
pub fn validate_schema(schema: Schema) -> Result<CompiledSchema, SchemaErrors> {
    let mut errors = Vec::new();
    check_schema(&schema, &KeyPath::root(), true, &mut errors);

    match SchemaErrors::from_vec(errors) {
        None => {
            tracing::debug!(keys = schema.len(), "schema compiled");
            Ok(CompiledSchema::new(schema))
        }
        Some(errors) => {
            tracing::debug!(errors = errors.len(), "schema rejected");
            Err(errors)
        }
    }
}

/// `expand` is false inside a lazily produced schema, so self-referential
/// producers are checked only once.
fn check_schema(schema: &Schema, path: &KeyPath, expand: bool, errors: &mut Vec<SchemaError>) {
    for (name, spec) in schema.iter() {
        let key_path = path.push_key(name);
        check_type(spec.ty(), &key_path, false, expand, errors);

        if let Some(keys) = spec.nested() {
            if !spec.ty().accepts_keys() {
                errors.push(
                    SchemaError::new(
                        key_path.clone(),
                        format!(
                            "keys can only be set on container types, got: {}",
                            spec.ty()
                        ),
                    )
                    .with_code("keys_not_allowed"),
                );
            }
            check_keys(keys, &key_path, expand, errors);
        }

        if let Some(default) = spec.default_value() {
            if let Err(err) = check_default(spec, name, default) {
                if err.kind != ErrorKind::UnresolvedReference {
                    errors.push(
                        SchemaError::new(key_path.clone(), format!("invalid default: {}", err))
                            .with_code("invalid_default"),
                    );
                }
            }
        }
    }
}

/// Runs a default through its key the way the walker would: type first,
/// then the key's own nested schema.
fn check_default(spec: &KeySpec, name: &str, default: &Value) -> Result<Value, ValidationError> {
    let key = ErrorKey::Key(name.to_string());
    let ctx = ValidationContext::new();
    let matched = match_type(spec.ty(), &key, default, &ctx)?;
    match spec.nested() {
        Some(keys) if spec.ty().accepts_keys() => descend(&matched, keys, &key, &ctx),
        _ => Ok(matched),
    }
}

fn check_keys(keys: &Keys, path: &KeyPath, expand: bool, errors: &mut Vec<SchemaError>) {
    match keys {
        Keys::Inline(nested) => check_schema(nested, path, expand, errors),
        Keys::Lazy(producer) if expand => check_schema(&producer(), path, false, errors),
        Keys::Lazy(_) | Keys::Ref(_) => {}
    }
}

fn check_type(
    ty: &Type,
    path: &KeyPath,
    keyed_allowed: bool,
    expand: bool,
    errors: &mut Vec<SchemaError>,
) {
    match ty {
        Type::Or(alternatives) => {
            if alternatives.is_empty() {
                errors.push(
                    SchemaError::new(path.clone(), "or requires at least one type")
                        .with_code("empty_or"),
                );
            }
            for alternative in alternatives {
                check_type(alternative, path, true, expand, errors);
            }
        }
        Type::ListOf(item) => check_type(item, path, true, expand, errors),
        Type::MapOf(key, value) => {
            check_type(key, path, false, expand, errors);
            check_type(value, path, false, expand, errors);
        }
        Type::Tuple(items) => {
            for item in items {
                check_type(item, path, false, expand, errors);
            }
        }
        Type::In(Choices::Range(range)) if range.is_empty() => errors.push(
            SchemaError::new(
                path.clone(),
                format!("empty range {}..{}", range.start(), range.end()),
            )
            .with_code("empty_range"),
        ),
        Type::Struct(tag) if tag.is_empty() => errors.push(
            SchemaError::new(path.clone(), "struct tag must not be empty")
                .with_code("empty_struct_tag"),
        ),
        Type::Keyed(container, keys) => {
            if !keyed_allowed {
                errors.push(
                    SchemaError::new(
                        path.clone(),
                        "keyed containers are only allowed inside or and list_of",
                    )
                    .with_code("keyed_not_allowed"),
                );
            }
            if !container.is_container() {
                errors.push(
                    SchemaError::new(
                        path.clone(),
                        format!("keyed type requires a container, got: {}", container),
                    )
                    .with_code("keyed_not_allowed"),
                );
            }
            check_keys(keys, path, expand, errors);
        }
        _ => {}
    }
}

/// Parses and compiles a raw schema.
pub(crate) fn from_value(
    raw: &Value,
    registry: Option<&Registry>,
) -> Result<CompiledSchema, SchemaErrors> {
    let schema = parse_schema(raw, &KeyPath::root(), registry).into_result()?;
    validate_schema(schema)
}

fn parse_schema(
    raw: &Value,
    path: &KeyPath,
    registry: Option<&Registry>,
) -> Validation<Schema, SchemaErrors> {
    let Some(entries) = raw.entries() else {
        return Validation::Failure(SchemaErrors::single(
            SchemaError::new(
                path.clone(),
                format!(
                    "expected a keyword list or a map with identifier keys, got: {}",
                    raw
                ),
            )
            .with_code("invalid_schema"),
        ));
    };

    let meta = key_spec_schema(registry);
    let mut schema = Schema::new();
    let mut failures: Option<SchemaErrors> = None;

    for (name, raw_spec) in &entries {
        match parse_key_spec(raw_spec, &meta, &path.push_key(name), registry) {
            Validation::Success(spec) => schema = schema.key(name.clone(), spec),
            Validation::Failure(errors) => {
                failures = Some(match failures.take() {
                    Some(acc) => acc.combine(errors),
                    None => errors,
                });
            }
        }
    }

    match failures {
        None => Validation::Success(schema),
        Some(errors) => Validation::Failure(errors),
    }
}

/// The schema every raw key spec must satisfy.
fn key_spec_schema(registry: Option<&Registry>) -> Schema {
    let registry = registry.cloned();
    let type_descriptor = CustomValidator::from_fn("type_descriptor", move |raw| {
        parse_type(raw, registry.as_ref()).map(|_| raw.clone())
    });

    Schema::new()
        .key("type", KeySpec::new(Type::custom(type_descriptor)).default("any"))
        .key("required", KeySpec::new(Type::Boolean).default(false))
        .key("default", KeySpec::any())
        .key(
            "keys",
            KeySpec::new(Type::or([
                Type::String,
                Type::Atom,
                Type::KeywordList,
                Type::Map,
            ])),
        )
        .key("deprecated", KeySpec::new(Type::String))
        .key(
            "doc",
            KeySpec::new(Type::or([Type::String, Type::one_of([false])])),
        )
        .key("subsection", KeySpec::new(Type::String))
        .key("type_doc", KeySpec::new(Type::String))
}

fn parse_key_spec(
    raw: &Value,
    meta: &Schema,
    path: &KeyPath,
    registry: Option<&Registry>,
) -> Validation<KeySpec, SchemaErrors> {
    let attrs = match walk_value(raw, meta, &ValidationContext::new()) {
        Ok(attrs) => attrs,
        Err(err) => return Validation::Failure(SchemaErrors::single(schema_error(path, err))),
    };

    let ty = match attrs.get("type").map(|raw_ty| parse_type(raw_ty, registry)) {
        Some(Ok(ty)) => ty,
        Some(Err(message)) => {
            return Validation::Failure(SchemaErrors::single(
                SchemaError::new(path.push_key("type"), message).with_code("invalid_type"),
            ))
        }
        None => Type::Any,
    };

    // A keyed shorthand at the top of a key spec is the spec's own `keys`.
    let (ty, shorthand) = match ty {
        Type::Keyed(container, keys) => (*container, Some(keys)),
        ty => (ty, None),
    };

    let mut spec = KeySpec::new(ty);
    if let Some(keys) = shorthand {
        spec = spec.with_keys(keys);
    }
    if attrs.get("required") == Some(&Value::Bool(true)) {
        spec = spec.required();
    }
    if let Some(default) = attrs.get("default") {
        spec = spec.default(default.clone());
    }
    if let Some(message) = attrs.get("deprecated").and_then(Value::as_identifier) {
        spec = spec.deprecated(message);
    }
    if let Some(doc) = attrs.get("doc").and_then(Value::as_identifier) {
        spec = spec.doc(doc);
    }
    if let Some(subsection) = attrs.get("subsection").and_then(Value::as_identifier) {
        spec = spec.subsection(subsection);
    }
    if let Some(type_doc) = attrs.get("type_doc").and_then(Value::as_identifier) {
        spec = spec.type_doc(type_doc);
    }

    let Some(nested) = attrs.get("keys") else {
        return Validation::Success(spec);
    };
    if spec.nested().is_some() {
        return Validation::Failure(SchemaErrors::single(
            SchemaError::new(
                path.push_key("keys"),
                "keys are already given by the keyed type",
            )
            .with_code("keys_not_allowed"),
        ));
    }
    if let Some(name) = nested.as_identifier() {
        return Validation::Success(spec.with_keys(Keys::Ref(name.to_string())));
    }
    match parse_schema(nested, path, registry) {
        Validation::Success(schema) => Validation::Success(spec.with_keys(Keys::from(schema))),
        Validation::Failure(errors) => Validation::Failure(errors),
    }
}

fn schema_error(at: &KeyPath, err: ValidationError) -> SchemaError {
    let mut path = at.join(&err.path);
    if let ErrorKey::Key(name) = &err.key {
        path = path.push_key(name);
    }
    SchemaError::new(path, err.message).with_code(err.kind.code())
}

/// Parses a raw type descriptor.
///
/// A descriptor is a name, a tuple `(name, args...)` or a single-entry
/// mapping `{name: arg}`.
fn parse_type(raw: &Value, registry: Option<&Registry>) -> Result<Type, String> {
    if let Some(name) = raw.as_identifier() {
        return simple_type(name).ok_or_else(|| format!("unknown type {}", raw));
    }

    match raw {
        Value::Tuple(items) => match items.split_first() {
            Some((name, args)) => {
                let name = name
                    .as_identifier()
                    .ok_or_else(|| format!("expected a type name, got: {}", name))?;
                parse_parameterized(name, args, registry)
            }
            None => Err("expected a type descriptor, got: ()".to_string()),
        },
        _ if raw.is_mapping() => {
            let entries = raw
                .entries()
                .ok_or_else(|| format!("expected a type descriptor, got: {}", raw))?;
            match entries.first() {
                Some((name, arg)) if entries.len() == 1 => {
                    parse_parameterized(name, std::slice::from_ref(arg), registry)
                }
                _ => Err(format!(
                    "expected a single-entry type descriptor, got: {}",
                    raw
                )),
            }
        }
        other => Err(format!("expected a type descriptor, got: {}", other)),
    }
}

fn simple_type(name: &str) -> Option<Type> {
    let ty = match name {
        "any" => Type::Any,
        "atom" => Type::Atom,
        "string" => Type::String,
        "boolean" => Type::Boolean,
        "integer" => Type::Integer,
        "non_neg_integer" => Type::NonNegInteger,
        "pos_integer" => Type::PosInteger,
        "float" => Type::Float,
        "timeout" => Type::Timeout,
        "pid" => Type::Pid,
        "reference" => Type::Reference,
        "null" => Type::Null,
        "keyword_list" => Type::KeywordList,
        "non_empty_keyword_list" => Type::NonEmptyKeywordList,
        "map" => Type::Map,
        _ => return None,
    };
    Some(ty)
}

/// Treats a single list argument as the argument list itself.
fn flatten(args: &[Value]) -> Vec<Value> {
    match args {
        [Value::List(items)] => items.clone(),
        _ => args.to_vec(),
    }
}

fn parse_parameterized(
    name: &str,
    args: &[Value],
    registry: Option<&Registry>,
) -> Result<Type, String> {
    match name {
        "map" => match args {
            [nested] if !matches!(nested, Value::List(_)) => keyed(Type::Map, nested, registry),
            _ => match flatten(args).as_slice() {
                [key, value] => Ok(Type::map_of(
                    parse_type(key, registry)?,
                    parse_type(value, registry)?,
                )),
                _ => Err(format!(
                    "map expects a key type and a value type, got: {}",
                    Value::List(args.to_vec())
                )),
            },
        },
        "keyword_list" | "non_empty_keyword_list" => match args {
            [nested] => {
                let container = simple_type(name).unwrap_or(Type::KeywordList);
                keyed(container, nested, registry)
            }
            _ => Err(format!("{} expects nested keys", name)),
        },
        "fun" => match args {
            [Value::Integer(arity)] if *arity >= 0 => usize::try_from(*arity)
                .map(Type::Fun)
                .map_err(|e| e.to_string()),
            _ => Err(format!(
                "fun expects a non-negative arity, got: {}",
                Value::List(args.to_vec())
            )),
        },
        "in" => match args {
            [Value::List(choices)] => Ok(Type::In(Choices::List(choices.clone()))),
            [Value::String(range)] => parse_range(range),
            _ => Err(format!(
                "in expects a list of choices or a range, got: {}",
                Value::List(args.to_vec())
            )),
        },
        "custom" => {
            let items = flatten(args);
            let (validator_name, bound) = items
                .split_first()
                .ok_or_else(|| "custom expects a validator name".to_string())?;
            let validator_name = validator_name
                .as_identifier()
                .ok_or_else(|| format!("expected a validator name, got: {}", validator_name))?;
            let validator = registry
                .and_then(|registry| registry.validator(validator_name))
                .ok_or_else(|| format!("unknown custom validator {}", validator_name))?;
            if bound.is_empty() {
                Ok(Type::custom(validator))
            } else {
                Ok(Type::custom(validator.with_args(bound.to_vec())))
            }
        }
        "or" => flatten(args)
            .iter()
            .map(|alternative| parse_type(alternative, registry))
            .collect::<Result<Vec<_>, _>>()
            .map(Type::Or),
        "list_of" => match args {
            [item] => parse_type(item, registry).map(Type::list_of),
            _ => Err("list_of expects exactly one type".to_string()),
        },
        "tuple" => flatten(args)
            .iter()
            .map(|item| parse_type(item, registry))
            .collect::<Result<Vec<_>, _>>()
            .map(Type::Tuple),
        "struct" => match args {
            [tag] => tag
                .as_identifier()
                .map(Type::struct_tag)
                .ok_or_else(|| format!("struct expects a tag, got: {}", tag)),
            _ => Err("struct expects exactly one tag".to_string()),
        },
        other if simple_type(other).is_some() => {
            Err(format!("type {} does not take arguments", other))
        }
        other => Err(format!("unknown type {}", other)),
    }
}

/// Builds the keyed-container shorthand from a nested raw schema or the name
/// of a registered schema.
fn keyed(container: Type, nested: &Value, registry: Option<&Registry>) -> Result<Type, String> {
    if let Some(name) = nested.as_identifier() {
        return Ok(Type::keyed(container, Keys::Ref(name.to_string())));
    }
    match parse_schema(nested, &KeyPath::root(), registry) {
        Validation::Success(schema) => Ok(Type::keyed(container, schema)),
        Validation::Failure(errors) => {
            let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
            Err(format!("invalid nested keys: {}", reasons.join("; ")))
        }
    }
}

fn parse_range(raw: &str) -> Result<Type, String> {
    let pattern = Regex::new(r"^\s*(-?\d+)\s*\.\.\s*(-?\d+)\s*$").map_err(|e| e.to_string())?;
    let captures = pattern
        .captures(raw)
        .ok_or_else(|| format!("expected a range like \"1..10\", got: {:?}", raw))?;

    let start: i64 = captures[1].parse().map_err(|e| format!("invalid range start: {}", e))?;
    let end: i64 = captures[2].parse().map_err(|e| format!("invalid range end: {}", e))?;
    Ok(Type::in_range(start..=end))
}
