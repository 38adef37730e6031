//! Tests for sharing schemas and registries across threads.

use optspec::{CustomValidator, KeySpec, Registry, Schema, Type, Value};
use serde_json::json;
use std::sync::Arc;
use std::thread;

fn user_schema() -> Schema {
    Schema::new()
        .key("name", KeySpec::new(Type::String).required())
        .key("age", KeySpec::new(Type::PosInteger))
}

#[test]
fn test_concurrent_validation() {
    let registry = Arc::new(Registry::new());
    registry.register_schema("User", user_schema()).unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let input = Value::from(json!({"name": format!("User{}", i), "age": 20 + i}));
                let result = registry.validate("User", &input).unwrap();
                assert!(result.is_ok());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_registration_and_lookup() {
    let registry = Registry::new();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || {
                let name = format!("Schema{}", i);
                registry.register_schema(name.clone(), user_schema()).unwrap();
                assert!(registry.schema(&name).is_some());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for i in 0..8 {
        assert!(registry.schema(&format!("Schema{}", i)).is_some());
    }
}

#[test]
fn test_only_one_duplicate_registration_wins() {
    let registry = Registry::new();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || registry.register_schema("Shared", user_schema()).is_ok())
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(successes, 1);
}

#[test]
fn test_shared_schema_with_custom_validator() {
    let even = CustomValidator::from_fn("even", |value| match value.as_integer() {
        Some(n) if n % 2 == 0 => Ok(value.clone()),
        _ => Err(format!("expected an even integer, got: {}", value)),
    });
    let schema = Schema::new()
        .key("n", KeySpec::new(Type::Custom(even)).required())
        .compile()
        .unwrap();

    let handles: Vec<_> = (0..10_i64)
        .map(|i| {
            let schema = schema.clone();
            thread::spawn(move || {
                let result = schema.validate(&Value::from(json!({ "n": i })));
                assert_eq!(result.is_ok(), i % 2 == 0);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_validate_all_with_registry_context() {
    let registry = Registry::new();
    registry
        .register_schema(
            "Node",
            Schema::new()
                .key("id", KeySpec::new(Type::Integer).required())
                .key("children", KeySpec::new(Type::list_of(Type::Map)).keys_ref("Node")),
        )
        .unwrap();

    let schema = registry.schema("Node").unwrap();
    let inputs: Vec<Value> = (0..50)
        .map(|i| {
            if i % 10 == 0 {
                Value::from(json!({"id": i, "children": [{"id": "bad"}]}))
            } else {
                Value::from(json!({"id": i, "children": [{"id": i + 1}]}))
            }
        })
        .collect();

    let results = schema.validate_all_with(&inputs, &registry.context());
    assert_eq!(results.len(), 50);
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(output) => {
                assert_ne!(i % 10, 0);
                assert_eq!(output.get("id"), Some(&Value::Integer(i as i64)));
            }
            Err(error) => {
                assert_eq!(i % 10, 0);
                assert_eq!(error.path.to_string(), "children[0]");
            }
        }
    }
}
