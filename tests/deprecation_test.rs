//! Tests for deprecation warnings emitted during validation.

use optspec::{KeySpec, Schema, Type, Value};
use serde_json::json;
use std::io;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.contents())
}

fn schema() -> Schema {
    Schema::new()
        .key(
            "old",
            KeySpec::new(Type::Integer).deprecated("use 'new' instead"),
        )
        .key("new", KeySpec::new(Type::Integer))
}

#[test]
fn test_deprecated_key_warns_and_validates() {
    let compiled = schema().compile().unwrap();
    let (result, logs) =
        with_captured_logs(|| compiled.validate(&Value::from(json!({"old": 1}))));

    let output = result.unwrap();
    assert_eq!(output.get("old"), Some(&Value::Integer(1)));
    assert!(logs.contains("'old' is deprecated. use 'new' instead"));
    assert!(logs.contains("WARN"));
}

#[test]
fn test_absent_deprecated_key_is_silent() {
    let compiled = schema().compile().unwrap();
    let (result, logs) =
        with_captured_logs(|| compiled.validate(&Value::from(json!({"new": 1}))));

    assert!(result.is_ok());
    assert!(!logs.contains("deprecated"));
}

#[test]
fn test_nested_deprecation_names_full_path() {
    let schema = Schema::new()
        .key("producer", KeySpec::new(Type::KeywordList).keys(schema()))
        .compile()
        .unwrap();

    let (result, logs) = with_captured_logs(|| {
        schema.validate(&Value::from(json!({"producer": {"old": 2}})))
    });

    assert!(result.is_ok());
    assert!(logs.contains("'old' is deprecated."));
    assert!(logs.contains("producer.old"));
}

#[test]
fn test_deprecated_key_still_type_checked() {
    let compiled = schema().compile().unwrap();
    let (result, logs) =
        with_captured_logs(|| compiled.validate(&Value::from(json!({"old": "one"}))));

    let error = result.unwrap_err();
    assert_eq!(error.message, "invalid value for 'old': expected integer, got: \"one\"");
    assert!(logs.contains("'old' is deprecated."));
}
