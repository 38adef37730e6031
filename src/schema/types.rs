//! Type descriptors.
//!
//! A [`Type`] describes what a single value must look like. The set of
//! descriptors is closed; the matcher handles every variant exhaustively.

use std::fmt::{self, Debug, Display};
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::value::Value;

use super::Keys;

/// The allowed values of an `in` type.
#[derive(Debug, Clone, PartialEq)]
pub enum Choices {
    /// An explicit list of allowed values.
    List(Vec<Value>),
    /// An inclusive integer range.
    Range(RangeInclusive<i64>),
}

impl Choices {
    /// Returns true if `value` is one of the choices.
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Choices::List(values) => values.contains(value),
            Choices::Range(range) => value.as_integer().is_some_and(|n| range.contains(&n)),
        }
    }
}

impl Display for Choices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choices::List(values) => write!(f, "{}", Value::List(values.clone())),
            Choices::Range(range) => write!(f, "{}..{}", range.start(), range.end()),
        }
    }
}

type ValidatorFn = Arc<dyn Fn(&Value, &[Value]) -> Result<Value, String> + Send + Sync>;

/// A user-supplied validation function with bound extra arguments.
///
/// The function receives the candidate value and the bound arguments and
/// returns either the (possibly transformed) value or a reason string.
///
/// # Example
///
/// ```rust
/// use optspec::{CustomValidator, Value};
///
/// let max_len = CustomValidator::new("max_len", |value, args| {
///     let limit = args.first().and_then(Value::as_integer).unwrap_or(0);
///     match value {
///         Value::String(s) if s.len() as i64 <= limit => Ok(value.clone()),
///         other => Err(format!("expected at most {} characters, got: {}", limit, other)),
///     }
/// })
/// .with_args(vec![Value::Integer(3)]);
///
/// assert!(max_len.call(&Value::from("abc")).is_ok());
/// assert!(max_len.call(&Value::from("abcd")).is_err());
/// ```
#[derive(Clone)]
pub struct CustomValidator {
    name: String,
    args: Vec<Value>,
    func: ValidatorFn,
}

impl CustomValidator {
    /// Creates a named validator that receives bound arguments.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            args: Vec::new(),
            func: Arc::new(func),
        }
    }

    /// Creates a named validator that only looks at the candidate value.
    pub fn from_fn<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::new(name, move |value, _| func(value))
    }

    /// Binds extra arguments passed on every call.
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Runs the validator against `value` with the bound arguments.
    pub fn call(&self, value: &Value) -> Result<Value, String> {
        (self.func)(value, &self.args)
    }
}

impl PartialEq for CustomValidator {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.args == other.args && Arc::ptr_eq(&self.func, &other.func)
    }
}

impl Debug for CustomValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValidator")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// A type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Any,
    Atom,
    String,
    Boolean,
    Integer,
    NonNegInteger,
    PosInteger,
    Float,
    /// A non-negative integer or the atom `infinity`.
    Timeout,
    Pid,
    Reference,
    Null,
    /// A keyword list, or a map with identifier keys.
    KeywordList,
    /// A keyword list with at least one entry.
    NonEmptyKeywordList,
    Map,
    /// A map whose every key and value match the given types.
    MapOf(Box<Type>, Box<Type>),
    /// A function of the given arity.
    Fun(usize),
    In(Choices),
    Custom(CustomValidator),
    /// Alternatives tried in order; the first that matches wins.
    Or(Vec<Type>),
    ListOf(Box<Type>),
    Tuple(Vec<Type>),
    /// A struct carrying the given tag.
    Struct(String),
    /// A container carrying its own nested schema, for use inside `Or` and
    /// `ListOf`.
    Keyed(Box<Type>, Keys),
}

impl Type {
    pub fn map_of(key: Type, value: Type) -> Self {
        Type::MapOf(Box::new(key), Box::new(value))
    }

    pub fn list_of(item: Type) -> Self {
        Type::ListOf(Box::new(item))
    }

    /// Creates an `in` type over an explicit list of values.
    pub fn one_of<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Type::In(Choices::List(values.into_iter().map(Into::into).collect()))
    }

    /// Creates an `in` type over an inclusive integer range.
    pub fn in_range(range: RangeInclusive<i64>) -> Self {
        Type::In(Choices::Range(range))
    }

    pub fn or(alternatives: impl IntoIterator<Item = Type>) -> Self {
        Type::Or(alternatives.into_iter().collect())
    }

    pub fn tuple(items: impl IntoIterator<Item = Type>) -> Self {
        Type::Tuple(items.into_iter().collect())
    }

    pub fn custom(validator: CustomValidator) -> Self {
        Type::Custom(validator)
    }

    pub fn struct_tag(tag: impl Into<String>) -> Self {
        Type::Struct(tag.into())
    }

    /// Attaches a nested schema to a container type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use optspec::{KeySpec, Schema, Type};
    ///
    /// let endpoint = Schema::new().key("host", KeySpec::new(Type::String).required());
    /// let ty = Type::list_of(Type::keyed(Type::KeywordList, endpoint));
    /// assert_eq!(ty.to_string(), "list_of(keyword_list(keys))");
    /// ```
    pub fn keyed(container: Type, keys: impl Into<Keys>) -> Self {
        Type::Keyed(Box::new(container), keys.into())
    }

    /// Returns true for the mapping container types.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Type::KeywordList | Type::NonEmptyKeywordList | Type::Map
        )
    }

    /// Returns true if a key spec of this type may carry nested `keys`.
    ///
    /// That is a container, a list of containers, or a union whose every
    /// alternative is a container.
    pub fn accepts_keys(&self) -> bool {
        match self {
            t if t.is_container() => true,
            Type::ListOf(item) => item.is_container(),
            Type::Or(alternatives) => {
                !alternatives.is_empty() && alternatives.iter().all(Type::is_container)
            }
            _ => false,
        }
    }

    /// Returns the descriptor name used in raw schemas.
    pub fn name(&self) -> &'static str {
        match self {
            Type::Any => "any",
            Type::Atom => "atom",
            Type::String => "string",
            Type::Boolean => "boolean",
            Type::Integer => "integer",
            Type::NonNegInteger => "non_neg_integer",
            Type::PosInteger => "pos_integer",
            Type::Float => "float",
            Type::Timeout => "timeout",
            Type::Pid => "pid",
            Type::Reference => "reference",
            Type::Null => "null",
            Type::KeywordList => "keyword_list",
            Type::NonEmptyKeywordList => "non_empty_keyword_list",
            Type::Map | Type::MapOf(..) => "map",
            Type::Fun(_) => "fun",
            Type::In(_) => "in",
            Type::Custom(_) => "custom",
            Type::Or(_) => "or",
            Type::ListOf(_) => "list_of",
            Type::Tuple(_) => "tuple",
            Type::Struct(_) => "struct",
            Type::Keyed(container, _) => container.name(),
        }
    }

    /// Collects the names of registry schemas referenced from this type.
    pub fn collect_refs(&self, refs: &mut Vec<String>) {
        match self {
            Type::MapOf(key, value) => {
                key.collect_refs(refs);
                value.collect_refs(refs);
            }
            Type::Or(items) | Type::Tuple(items) => {
                for item in items {
                    item.collect_refs(refs);
                }
            }
            Type::ListOf(item) => item.collect_refs(refs),
            Type::Keyed(container, keys) => {
                container.collect_refs(refs);
                keys.collect_refs(refs);
            }
            _ => {}
        }
    }
}

fn write_types(f: &mut fmt::Formatter<'_>, items: &[Type]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::MapOf(key, value) => write!(f, "map({}, {})", key, value),
            Type::Fun(arity) => write!(f, "fun({})", arity),
            Type::In(choices) => write!(f, "in({})", choices),
            Type::Custom(validator) => write!(f, "custom({})", validator.name()),
            Type::Or(items) => {
                f.write_str("or(")?;
                write_types(f, items)?;
                f.write_str(")")
            }
            Type::ListOf(item) => write!(f, "list_of({})", item),
            Type::Tuple(items) => {
                f.write_str("tuple(")?;
                write_types(f, items)?;
                f.write_str(")")
            }
            Type::Struct(tag) => write!(f, "struct({})", tag),
            Type::Keyed(container, _) => write!(f, "{}(keys)", container),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{KeySpec, Schema};

    #[test]
    fn test_choices_contains() {
        let list = Choices::List(vec![Value::atom("a"), Value::from("b")]);
        assert!(list.contains(&Value::atom("a")));
        assert!(list.contains(&Value::from("b")));
        assert!(!list.contains(&Value::from("a")));

        let range = Choices::Range(1..=3);
        assert!(range.contains(&Value::Integer(1)));
        assert!(range.contains(&Value::Integer(3)));
        assert!(!range.contains(&Value::Integer(4)));
        assert!(!range.contains(&Value::Float(2.0)));
    }

    #[test]
    fn test_accepts_keys() {
        assert!(Type::Map.accepts_keys());
        assert!(Type::NonEmptyKeywordList.accepts_keys());
        assert!(Type::list_of(Type::KeywordList).accepts_keys());
        assert!(Type::or([Type::Map, Type::KeywordList]).accepts_keys());

        assert!(!Type::Integer.accepts_keys());
        assert!(!Type::list_of(Type::Integer).accepts_keys());
        assert!(!Type::or([Type::Map, Type::Integer]).accepts_keys());
        assert!(!Type::Or(Vec::new()).accepts_keys());
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::Integer.to_string(), "integer");
        assert_eq!(
            Type::map_of(Type::Atom, Type::String).to_string(),
            "map(atom, string)"
        );
        assert_eq!(Type::in_range(1..=5).to_string(), "in(1..5)");
        assert_eq!(
            Type::one_of([Value::atom("a"), Value::atom("b")]).to_string(),
            "in([:a, :b])"
        );
        assert_eq!(
            Type::or([Type::String, Type::list_of(Type::Integer)]).to_string(),
            "or(string, list_of(integer))"
        );
        assert_eq!(Type::Fun(2).to_string(), "fun(2)");
    }

    #[test]
    fn test_collect_refs() {
        let inline = Schema::new().key(
            "child",
            KeySpec::new(Type::Map).keys_ref("Child"),
        );
        let ty = Type::or([
            Type::keyed(Type::Map, Keys::Ref("Node".to_string())),
            Type::list_of(Type::keyed(Type::KeywordList, inline)),
        ]);

        let mut refs = Vec::new();
        ty.collect_refs(&mut refs);
        assert_eq!(refs, vec!["Node".to_string(), "Child".to_string()]);
    }

    #[test]
    fn test_custom_validator_identity() {
        let v = CustomValidator::from_fn("even", |value| match value.as_integer() {
            Some(n) if n % 2 == 0 => Ok(value.clone()),
            _ => Err("expected an even integer".to_string()),
        });
        let same = v.clone();
        let rebound = v.clone().with_args(vec![Value::Integer(1)]);

        assert_eq!(v, same);
        assert_ne!(v, rebound);
        assert_eq!(v.call(&Value::Integer(2)), Ok(Value::Integer(2)));
        assert!(v.call(&Value::Integer(3)).is_err());
    }
}
