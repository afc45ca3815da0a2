//! In-memory document values
//!
//! A [`Value`] is what callers hand to the shaper and what the decoder gives
//! back. Objects keep their fields in insertion order; the shaper imposes its
//! own canonical order when a value is encoded.

// this_file: crates/vellum-core/src/value.rs

use std::fmt;

/// A document value
///
/// The variants mirror the primitives a JSON-like document can carry. Object
/// field names are unique per object; [`Value::set`] enforces this by
/// replacing an existing field of the same name.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    /// IEEE-754 double; integers arriving via JSON are widened
    Number(f64),
    String(String),
    /// Ordered, possibly heterogeneous sequence
    List(Vec<Value>),
    /// Ordered mapping from attribute name to value
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Shorthand for an object value built from name/value pairs
    pub fn object<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Value::Object(fields.into_iter().collect())
    }

    /// Look up a field by name on an object value
    ///
    /// Returns `None` for non-object values and missing fields.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Set a field on an object value, replacing any existing field with the
    /// same name
    ///
    /// Has no effect on non-object values.
    pub fn set(&mut self, name: &str, value: Value) {
        if let Value::Object(fields) = self {
            match fields.iter_mut().find(|(n, _)| n == name) {
                Some((_, slot)) => *slot = value,
                None => fields.push((name.to_owned(), value)),
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }
}

/// Structural equality
///
/// Lists compare element-wise in order; objects compare as maps, so two
/// objects with the same fields in different order are equal. This matches
/// the shaper's view: field order never survives encoding.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(name, value)| other.get(name).is_some_and(|v| v == value))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{name:?}:{value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
