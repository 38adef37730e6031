//! Matching a single value against a type descriptor.

use crate::error::{ErrorKey, ErrorKind, ValidationError};
use crate::schema::Type;
use crate::validation::ValidationContext;
use crate::value::{Map, Value};

use super::walker::descend;

/// Matches `value` against `ty`, returning the validated value.
///
/// `key` names where the value sits in its container and is used in error
/// messages. An error coming out of a nested schema walk already carries the
/// segment for `key` in its path.
pub(crate) fn match_type(
    ty: &Type,
    key: &ErrorKey,
    value: &Value,
    ctx: &ValidationContext,
) -> Result<Value, ValidationError> {
    match (ty, value) {
        (Type::Any, _) => Ok(value.clone()),
        (Type::Atom, Value::Atom(_))
        | (Type::String, Value::String(_))
        | (Type::Boolean, Value::Bool(_))
        | (Type::Integer, Value::Integer(_))
        | (Type::Float, Value::Float(_))
        | (Type::Pid, Value::Pid(_))
        | (Type::Reference, Value::Reference(_))
        | (Type::Null, Value::Null)
        | (Type::Map, Value::Map(_)) => Ok(value.clone()),
        (Type::NonNegInteger, Value::Integer(n)) if *n >= 0 => Ok(value.clone()),
        (Type::PosInteger, Value::Integer(n)) if *n > 0 => Ok(value.clone()),
        (Type::Timeout, Value::Integer(n)) if *n >= 0 => Ok(value.clone()),
        (Type::Timeout, Value::Atom(a)) if a == "infinity" => Ok(value.clone()),
        (Type::KeywordList, _) if is_keyword_list(value) => Ok(value.clone()),
        (Type::NonEmptyKeywordList, _)
            if is_keyword_list(value) && value.entries().is_some_and(|e| !e.is_empty()) =>
        {
            Ok(value.clone())
        }
        (Type::MapOf(key_type, value_type), Value::Map(map)) => {
            match_map(key_type, value_type, map, ctx.at(key.segment()))
                .map_err(|err| within(err, "map", key, value))
        }
        (Type::Fun(arity), Value::Fun(fun)) if fun.arity() == *arity => Ok(value.clone()),
        (Type::In(choices), _) if choices.contains(value) => Ok(value.clone()),
        (Type::Custom(validator), _) => validator.call(value).map_err(|reason| {
            ValidationError::new(
                ErrorKind::Custom,
                key.clone(),
                format!("invalid value for {}: {}", key, reason),
            )
            .with_value(value.clone())
        }),
        (Type::Or(alternatives), _) => match_any(alternatives, key, value, ctx),
        (Type::ListOf(item_type), Value::List(items)) => {
            match_items(items.iter().map(|item| (item_type.as_ref(), item)), key, ctx)
                .map(Value::List)
                .map_err(|err| within(err, "list", key, value))
        }
        (Type::Tuple(types), Value::Tuple(items)) if types.len() == items.len() => {
            match_items(types.iter().zip(items), key, ctx)
                .map(Value::Tuple)
                .map_err(|err| within(err, "tuple", key, value))
        }
        (Type::Struct(tag), Value::Struct { tag: actual, .. }) if tag == actual => {
            Ok(value.clone())
        }
        (Type::Keyed(container, keys), _) => {
            let matched = match_type(container, key, value, ctx)?;
            descend(&matched, keys, key, ctx)
        }
        _ => Err(mismatch(ty, key, value)),
    }
}

fn is_keyword_list(value: &Value) -> bool {
    match value {
        Value::Keywords(_) => true,
        Value::Map(_) => value.entries().is_some(),
        _ => false,
    }
}

fn match_items<'a>(
    pairs: impl Iterator<Item = (&'a Type, &'a Value)>,
    key: &ErrorKey,
    ctx: &ValidationContext,
) -> Result<Vec<Value>, ValidationError> {
    let ctx = ctx.at(key.segment());
    pairs
        .enumerate()
        .map(|(index, (ty, item))| match_type(ty, &ErrorKey::Position(index), item, &ctx))
        .collect()
}

fn match_map(
    key_type: &Type,
    value_type: &Type,
    map: &Map,
    ctx: ValidationContext,
) -> Result<Value, ValidationError> {
    map.iter()
        .map(|(k, v)| {
            let k = match_type(key_type, &ErrorKey::MapKey, k, &ctx)?;
            let v = match_type(value_type, &ErrorKey::MapValue(k.clone()), v, &ctx)?;
            Ok((k, v))
        })
        .collect::<Result<Map, _>>()
        .map(Value::Map)
}

fn match_any(
    alternatives: &[Type],
    key: &ErrorKey,
    value: &Value,
    ctx: &ValidationContext,
) -> Result<Value, ValidationError> {
    let mut failures = Vec::with_capacity(alternatives.len());
    for alternative in alternatives {
        match match_type(alternative, key, value, ctx) {
            Ok(matched) => return Ok(matched),
            Err(err) => failures.push(err),
        }
    }

    let reasons: String = failures
        .iter()
        .map(|err| format!("\n  * {}", err))
        .collect();
    Err(ValidationError::new(
        ErrorKind::UnionExhausted,
        key.clone(),
        format!(
            "expected {} to match at least one given type, but didn't match any. \
             Here are the reasons why it didn't match each of the allowed types:{}",
            key, reasons
        ),
    )
    .with_value(value.clone())
    .with_causes(failures))
}

/// Lifts an element failure out of a composite value.
///
/// Failures from nested schema walks keep their leaf and gain the container's
/// segment. Anything else is reported against the container.
fn within(err: ValidationError, noun: &str, key: &ErrorKey, container: &Value) -> ValidationError {
    if err.is_nested() {
        return err.nest(key.segment());
    }
    ValidationError::new(
        err.kind,
        key.clone(),
        format!("invalid {} in {}: {}", noun, key, err.message),
    )
    .with_value(container.clone())
    .with_cause(err)
}

fn mismatch(ty: &Type, key: &ErrorKey, value: &Value) -> ValidationError {
    ValidationError::new(
        ErrorKind::Shape,
        key.clone(),
        format!(
            "invalid value for {}: expected {}, got: {}",
            key,
            expected(ty),
            value
        ),
    )
    .with_value(value.clone())
}

fn expected(ty: &Type) -> String {
    match ty {
        Type::NonNegInteger => "non-negative integer".to_string(),
        Type::PosInteger => "positive integer".to_string(),
        Type::Timeout => "non-negative integer or :infinity".to_string(),
        Type::KeywordList => "keyword list".to_string(),
        Type::NonEmptyKeywordList => "non-empty keyword list".to_string(),
        Type::Fun(arity) => format!("function of arity {}", arity),
        Type::In(choices) => format!("one of {}", choices),
        Type::ListOf(_) => "list".to_string(),
        Type::Tuple(types) => format!("tuple with {} elements", types.len()),
        Type::Struct(tag) => format!("struct {}", tag),
        Type::Keyed(container, _) => expected(container),
        other => other.name().to_string(),
    }
}
