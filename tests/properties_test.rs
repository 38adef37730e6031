//! Property-based tests for the structural walker and schema checks.

use std::collections::BTreeMap;

use optspec::{validate_schema, ErrorKind, KeySpec, Schema, Type, Value};
use proptest::prelude::*;

/// Strategy for schemas of optional integer keys, some with defaults.
fn optional_keys() -> impl Strategy<Value = BTreeMap<String, Option<i64>>> {
    prop::collection::btree_map("[a-m]{1,8}", prop::option::of(-5_i64..50), 0..8)
}

fn build_schema(keys: &BTreeMap<String, Option<i64>>, ty: Type) -> Schema {
    keys.iter()
        .map(|(name, default)| {
            let spec = KeySpec::new(ty.clone());
            let spec = match default {
                Some(value) => spec.default(*value),
                None => spec,
            };
            (name.clone(), spec)
        })
        .collect()
}

fn key_names(value: &Value) -> Vec<String> {
    value
        .entries()
        .map(|entries| entries.keys().cloned().collect())
        .unwrap_or_default()
}

proptest! {
    /// Empty input passes a schema without required keys and yields exactly
    /// the defaulted keys, in declaration order.
    #[test]
    fn empty_input_yields_defaults(keys in optional_keys()) {
        let schema = build_schema(&keys, Type::Integer).compile().unwrap();
        let output = schema.validate(&Value::keywords(Vec::<(String, Value)>::new()));
        prop_assert!(output.is_ok());

        let expected: Vec<String> = keys
            .iter()
            .filter(|(_, default)| default.is_some())
            .map(|(name, _)| name.clone())
            .collect();
        prop_assert_eq!(key_names(&output.unwrap()), expected);
    }

    /// Validating an already validated value changes nothing.
    #[test]
    fn validation_is_idempotent(
        keys in optional_keys(),
        values in prop::collection::vec(any::<i64>(), 8),
    ) {
        let schema = build_schema(&keys, Type::Integer).compile().unwrap();
        let input = Value::keywords(
            keys.keys()
                .zip(values)
                .enumerate()
                .filter(|(i, _)| i % 2 == 0)
                .map(|(_, (name, value))| (name.clone(), value)),
        );

        let once = schema.validate(&input).unwrap();
        let twice = schema.validate(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Schema checking reports one error per default that fails its type and
    /// hands back a well-formed schema unchanged.
    #[test]
    fn schema_check_counts_bad_defaults(keys in optional_keys()) {
        let schema = build_schema(&keys, Type::PosInteger);
        let bad = keys
            .values()
            .filter(|default| matches!(default, Some(value) if *value <= 0))
            .count();

        match validate_schema(schema.clone()) {
            Ok(compiled) => {
                prop_assert_eq!(bad, 0);
                let again = validate_schema(compiled.clone().into_schema());
                prop_assert_eq!(again.ok(), Some(compiled));
            }
            Err(errors) => {
                prop_assert_eq!(errors.len(), bad);
                prop_assert_eq!(errors.with_code("invalid_default").len(), bad);
            }
        }
    }

    /// A key the schema does not declare is always rejected.
    #[test]
    fn undeclared_key_rejected(keys in optional_keys(), suffix in "[a-z]{1,4}") {
        let schema = build_schema(&keys, Type::Integer).compile().unwrap();
        let input = Value::keywords([(format!("unknown_{}", suffix), 1)]);

        let error = schema.validate(&input).unwrap_err();
        prop_assert_eq!(error.kind, ErrorKind::UnknownKeys);
    }

    /// The first matching alternative of a union decides the result.
    #[test]
    fn union_accepts_any_alternative(n in any::<i64>(), s in "[a-z]{0,10}") {
        let schema = Schema::new().key(
            "v",
            KeySpec::new(Type::or([Type::Integer, Type::String])).required(),
        )
        .compile()
        .unwrap();

        prop_assert!(schema.validate(&Value::keywords([("v", n)])).is_ok());
        prop_assert!(schema.validate(&Value::keywords([("v", s.as_str())])).is_ok());
        let rejected = schema.validate(&Value::keywords([("v", true)])).unwrap_err();
        prop_assert_eq!(rejected.kind, ErrorKind::UnionExhausted);
        prop_assert_eq!(rejected.causes().len(), 2);
    }
}
