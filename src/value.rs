//! Dynamic values validated by schemas.
//!
//! This module provides [`Value`], the in-memory data model the validator
//! consumes and produces. Format adapters build values from their own
//! representation; conversion from and to `serde_json::Value` is provided here.

use std::collections::HashSet;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::mem;
use std::sync::Arc;

use indexmap::IndexMap;

/// An ordered mapping with unique identifier keys (a keyword list).
pub type Keywords = IndexMap<String, Value>;

/// An ordered mapping with arbitrary value keys.
pub type Map = IndexMap<Value, Value>;

type FunBody = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// A callable value with a fixed arity.
///
/// Functions compare by identity: two `Fun`s are equal only if one is a clone
/// of the other.
#[derive(Clone)]
pub struct Fun {
    name: String,
    arity: usize,
    body: FunBody,
}

impl Fun {
    /// Creates a named function taking exactly `arity` arguments.
    pub fn new<F>(name: impl Into<String>, arity: usize, body: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            arity,
            body: Arc::new(body),
        }
    }

    /// Returns the function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of arguments the function takes.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Calls the function, returning `None` when the argument count does not
    /// match the arity.
    pub fn call(&self, args: &[Value]) -> Option<Value> {
        (args.len() == self.arity).then(|| (self.body)(args))
    }
}

impl PartialEq for Fun {
    fn eq(&self, other: &Self) -> bool {
        self.arity == other.arity && Arc::ptr_eq(&self.body, &other.body)
    }
}

impl Eq for Fun {}

impl Hash for Fun {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.arity.hash(state);
    }
}

impl Debug for Fun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fun")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// A dynamically typed value.
///
/// Floats compare and hash by bit pattern so that `Value` can be used as a
/// [`Map`] key.
///
/// # Example
///
/// ```rust
/// use optspec::Value;
/// use serde_json::json;
///
/// let value = Value::from(json!({"url": "https://example.com", "pool": 5}));
/// assert_eq!(value.get("pool"), Some(&Value::Integer(5)));
/// assert_eq!(Value::atom("infinity").to_string(), ":infinity");
/// ```
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// A symbolic name.
    Atom(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Keywords(Keywords),
    Map(Map),
    /// A record tagged with a nominal type name.
    Struct { tag: String, fields: Keywords },
    Fun(Fun),
    /// A process handle.
    Pid(u64),
    Reference(u64),
}

impl Value {
    /// Creates an atom.
    pub fn atom(name: impl Into<String>) -> Self {
        Value::Atom(name.into())
    }

    /// Creates a keyword list from `(key, value)` pairs.
    ///
    /// Later duplicates overwrite earlier entries in place.
    pub fn keywords<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Keywords(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Creates a map from `(key, value)` pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Creates a tuple.
    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    /// Creates a struct carrying `tag`.
    pub fn structure<K, V, I>(tag: impl Into<String>, fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Struct {
            tag: tag.into(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns a short name for the kind of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Atom(_) => "atom",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Keywords(_) => "keyword list",
            Value::Map(_) => "map",
            Value::Struct { .. } => "struct",
            Value::Fun(_) => "function",
            Value::Pid(_) => "pid",
            Value::Reference(_) => "reference",
        }
    }

    /// Returns the name carried by a string or atom.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Atom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns true for keyword lists and maps.
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Keywords(_) | Value::Map(_))
    }

    /// Returns the entries of a keyword list, or of a map whose keys are all
    /// strings or atoms with distinct names, keyed by name.
    ///
    /// Returns `None` for any other value, including a map holding both
    /// `"a"` and `:a`.
    pub fn entries(&self) -> Option<Keywords> {
        match self {
            Value::Keywords(entries) => Some(entries.clone()),
            Value::Map(map) => {
                let mut entries = Keywords::with_capacity(map.len());
                for (k, v) in map {
                    let name = k.as_identifier()?;
                    if entries.insert(name.to_string(), v.clone()).is_some() {
                        return None;
                    }
                }
                Some(entries)
            }
            _ => None,
        }
    }

    /// Returns the first identifier a map carries under two keys, as a
    /// string and as an atom.
    pub fn duplicate_identifier(&self) -> Option<&str> {
        let Value::Map(map) = self else {
            return None;
        };
        let mut seen = HashSet::with_capacity(map.len());
        map.keys()
            .filter_map(Value::as_identifier)
            .find(|name| !seen.insert(*name))
    }

    /// Looks up an entry of a keyword list or a map by identifier.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Keywords(entries) => entries.get(key),
            Value::Map(map) => map
                .get(&Value::String(key.to_string()))
                .or_else(|| map.get(&Value::Atom(key.to_string()))),
            _ => None,
        }
    }

    /// Converts this value to JSON.
    ///
    /// Atoms become strings, tuples become arrays, struct tags are dropped and
    /// values with no JSON counterpart (functions, pids, references, non-finite
    /// floats) are rendered with their display form or as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Integer(n) => Json::from(*n),
            Value::Float(x) => serde_json::Number::from_f64(*x)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) | Value::Atom(s) => Json::String(s.clone()),
            Value::List(items) | Value::Tuple(items) => {
                Json::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Keywords(entries) | Value::Struct { fields: entries, .. } => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| {
                        let key = k
                            .as_identifier()
                            .map(str::to_string)
                            .unwrap_or_else(|| k.to_string());
                        (key, v.to_json())
                    })
                    .collect(),
            ),
            Value::Fun(_) | Value::Pid(_) | Value::Reference(_) => Json::String(self.to_string()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) | (Value::Atom(a), Value::Atom(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Keywords(a), Value::Keywords(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (
                Value::Struct { tag: t1, fields: f1 },
                Value::Struct { tag: t2, fields: f2 },
            ) => t1 == t2 && f1 == f2,
            (Value::Fun(a), Value::Fun(b)) => a == b,
            (Value::Pid(a), Value::Pid(b)) | (Value::Reference(a), Value::Reference(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Integer(n) => n.hash(state),
            Value::Float(x) => x.to_bits().hash(state),
            Value::String(s) | Value::Atom(s) => s.hash(state),
            Value::List(items) | Value::Tuple(items) => items.hash(state),
            // Mapping equality ignores entry order, so only the size is hashed.
            Value::Keywords(entries) => entries.len().hash(state),
            Value::Map(map) => map.len().hash(state),
            Value::Struct { tag, fields } => {
                tag.hash(state);
                fields.len().hash(state);
            }
            Value::Fun(fun) => fun.hash(state),
            Value::Pid(id) | Value::Reference(id) => id.hash(state),
        }
    }
}

fn write_joined<I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: IntoIterator,
    I::Item: Display,
{
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Atom(a) => write!(f, ":{}", a),
            Value::List(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            Value::Tuple(items) => {
                f.write_str("(")?;
                write_joined(f, items)?;
                f.write_str(")")
            }
            Value::Keywords(entries) => {
                f.write_str("[")?;
                write_joined(f, entries.iter().map(|(k, v)| format!("{}: {}", k, v)))?;
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                write_joined(f, map.iter().map(|(k, v)| format!("{} => {}", k, v)))?;
                f.write_str("}")
            }
            Value::Struct { tag, fields } => {
                write!(f, "{} {{", tag)?;
                write_joined(f, fields.iter().map(|(k, v)| format!("{}: {}", k, v)))?;
                f.write_str("}")
            }
            Value::Fun(fun) => write!(f, "fn {}/{}", fun.name, fun.arity),
            Value::Pid(id) => write!(f, "pid<{}>", id),
            Value::Reference(id) => write!(f, "ref<{}>", id),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Fun> for Value {
    fn from(fun: Fun) -> Self {
        Value::Fun(fun)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (Value::String(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Value>();
    assert_sync::<Value>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Integer(-3).to_string(), "-3");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::from("no").to_string(), "\"no\"");
        assert_eq!(Value::atom("infinity").to_string(), ":infinity");
        assert_eq!(Value::Pid(7).to_string(), "pid<7>");
        assert_eq!(Value::Reference(9).to_string(), "ref<9>");
    }

    #[test]
    fn test_display_containers() {
        let list = Value::List(vec![Value::Integer(1), Value::from("a")]);
        assert_eq!(list.to_string(), "[1, \"a\"]");

        let tuple = Value::tuple([Value::atom("ok"), Value::Integer(1)]);
        assert_eq!(tuple.to_string(), "(:ok, 1)");

        let keywords = Value::keywords([("a", 1), ("b", 2)]);
        assert_eq!(keywords.to_string(), "[a: 1, b: 2]");

        let map = Value::map([("a", 1)]);
        assert_eq!(map.to_string(), "{\"a\" => 1}");

        let record = Value::structure("Point", [("x", 1)]);
        assert_eq!(record.to_string(), "Point {x: 1}");

        let fun = Fun::new("handler", 2, |_| Value::Null);
        assert_eq!(Value::Fun(fun).to_string(), "fn handler/2");
    }

    #[test]
    fn test_mapping_equality_ignores_order() {
        let a = Value::keywords([("a", 1), ("b", 2)]);
        let b = Value::keywords([("b", 2), ("a", 1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_float_equality_by_bits() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_ne!(Value::Float(1.0), Value::Integer(1));
    }

    #[test]
    fn test_fun_identity() {
        let fun = Fun::new("f", 1, |args| args[0].clone());
        let same = fun.clone();
        let other = Fun::new("f", 1, |args| args[0].clone());

        assert_eq!(fun, same);
        assert_ne!(fun, other);
        assert_eq!(fun.call(&[Value::Integer(4)]), Some(Value::Integer(4)));
        assert_eq!(fun.call(&[]), None);
    }

    #[test]
    fn test_values_as_map_keys() {
        let map = Value::map([(Value::Integer(1), "one"), (Value::atom("two"), "two")]);
        match map {
            Value::Map(m) => {
                assert_eq!(m.get(&Value::Integer(1)), Some(&Value::from("one")));
                assert_eq!(m.get(&Value::atom("two")), Some(&Value::from("two")));
            }
            _ => panic!("Expected map"),
        }
    }

    #[test]
    fn test_entries_requires_identifier_keys() {
        let map = Value::map([(Value::atom("a"), 1), (Value::from("b"), 2)]);
        let entries = map.entries().unwrap();
        assert_eq!(entries.get("a"), Some(&Value::Integer(1)));
        assert_eq!(entries.get("b"), Some(&Value::Integer(2)));

        let numeric = Value::map([(Value::Integer(1), 1)]);
        assert!(numeric.entries().is_none());
        assert!(Value::Integer(1).entries().is_none());
    }

    #[test]
    fn test_entries_rejects_string_and_atom_with_same_name() {
        let map = Value::map([
            (Value::from("a"), Value::from("x")),
            (Value::atom("a"), Value::Integer(1)),
        ]);
        assert!(map.entries().is_none());
        assert_eq!(map.duplicate_identifier(), Some("a"));

        let distinct = Value::map([(Value::from("a"), 1), (Value::atom("b"), 2)]);
        assert!(distinct.duplicate_identifier().is_none());
        assert!(Value::keywords([("a", 1)]).duplicate_identifier().is_none());
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({"a": [1, 2.5, null], "b": {"c": true}}));
        assert_eq!(
            value.get("a"),
            Some(&Value::List(vec![
                Value::Integer(1),
                Value::Float(2.5),
                Value::Null
            ]))
        );
        assert_eq!(
            value.get("b").and_then(|b| b.get("c")),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn test_to_json() {
        let value = Value::keywords([
            ("mode", Value::atom("fast")),
            ("pair", Value::tuple([Value::Integer(1), Value::Integer(2)])),
        ]);
        assert_eq!(value.to_json(), json!({"mode": "fast", "pair": [1, 2]}));
    }
}
