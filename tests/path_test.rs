//! Integration tests for KeyPath.

use optspec::{KeyPath, KeySpec, PathSegment, Schema, Type, Value};
use serde_json::json;

#[test]
fn test_path_construction_and_display() {
    assert_eq!(KeyPath::root().to_string(), "");
    assert_eq!(KeyPath::from_key("name").to_string(), "name");
    assert_eq!(KeyPath::root().push_index(0).to_string(), "[0]");

    let path = KeyPath::root()
        .push_key("producer")
        .push_index(0)
        .push_key("options")
        .push_key("rate");
    assert_eq!(path.to_string(), "producer[0].options.rate");
}

#[test]
fn test_path_segments_preserved() {
    let path = KeyPath::from_key("data").push_index(42).push_key("value");

    let segments: Vec<&PathSegment> = path.segments().collect();
    assert_eq!(
        segments,
        vec![
            &PathSegment::key("data"),
            &PathSegment::index(42),
            &PathSegment::key("value"),
        ]
    );
    assert_eq!(path.first(), Some(&PathSegment::key("data")));
    assert_eq!(path.last(), Some(&PathSegment::key("value")));
}

#[test]
fn test_path_is_immutable() {
    let base = KeyPath::from_key("items");

    let first = base.push_index(0);
    let second = base.push_index(1);
    let prefixed = base.prepend(PathSegment::key("order"));

    assert_eq!(base.to_string(), "items");
    assert_eq!(first.to_string(), "items[0]");
    assert_eq!(second.to_string(), "items[1]");
    assert_eq!(prefixed.to_string(), "order.items");
}

#[test]
fn test_join_and_collect() {
    let outer = KeyPath::from_key("a").push_index(2);
    let inner = KeyPath::from_key("b").push_key("c");
    assert_eq!(outer.join(&inner).to_string(), "a[2].b.c");

    let collected: KeyPath = vec![PathSegment::key("x"), PathSegment::index(1)]
        .into_iter()
        .collect();
    assert_eq!(collected, KeyPath::from_key("x").push_index(1));
}

#[test]
fn test_path_from_validation_failure() {
    let schema = Schema::new().key(
        "producer",
        KeySpec::new(Type::KeywordList).keys(Schema::new().key(
            "stages",
            KeySpec::new(Type::list_of(Type::Map)).keys(
                Schema::new().key("name", KeySpec::new(Type::String).required()),
            ),
        )),
    )
    .compile()
    .unwrap();

    let error = schema
        .validate(&Value::from(json!({
            "producer": {"stages": [{"name": "a"}, {"name": "b"}, {}]}
        })))
        .unwrap_err();

    assert_eq!(
        error.path,
        KeyPath::from_key("producer").push_key("stages").push_index(2)
    );
    assert_eq!(error.path.to_string(), "producer.stages[2]");
}
