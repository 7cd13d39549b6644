//! Values that can be declared as a `Default` and stored through a `Slot`.
//!
//! The set of permitted value types is closed: [`ValueType`] is the tag and
//! [`Value`] carries the payload. Agreement between a variable's default and
//! its slot is a comparison of tags.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Type tag for a [`Value`] or a [`Target`](crate::Target).
///
/// # Examples
///
/// ```
/// use tri_core::{Value, ValueType};
///
/// assert_eq!(Value::from("~/.pod").value_type(), ValueType::Text);
/// assert_eq!(ValueType::TextList.to_string(), "string list");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// `bool`
    Bool,
    /// `String`
    Text,
    /// `Vec<String>`
    TextList,
    /// `i64`
    Integer,
    /// `u32`
    Unsigned,
    /// `f64`
    Float,
    /// [`std::time::Duration`]
    Duration,
}

impl ValueType {
    /// Human-readable name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Text => "string",
            Self::TextList => "string list",
            Self::Integer => "integer",
            Self::Unsigned => "unsigned integer",
            Self::Float => "float",
            Self::Duration => "duration",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A primitive value inside a specification tree.
///
/// Strings and integers double as the positional primitives of node kinds
/// (names, brief text, version components); every variant can be a `Default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Text(String),
    TextList(Vec<String>),
    Integer(i64),
    Unsigned(u32),
    Float(f64),
    Duration(Duration),
}

impl Value {
    /// Returns the type tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Text(_) => ValueType::Text,
            Self::TextList(_) => ValueType::TextList,
            Self::Integer(_) => ValueType::Integer,
            Self::Unsigned(_) => ValueType::Unsigned,
            Self::Float(_) => ValueType::Float,
            Self::Duration(_) => ValueType::Duration,
        }
    }

    /// Returns the string payload, if this is a [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is a [`Value::Integer`].
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::TextList(list) => write!(f, "{list:?}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Unsigned(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Duration(d) => write!(f, "{d:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Self::TextList(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Unsigned(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Self::Duration(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_tags() {
        assert_eq!(Value::from(true).value_type(), ValueType::Bool);
        assert_eq!(Value::from(7i64).value_type(), ValueType::Integer);
        assert_eq!(Value::from(7u32).value_type(), ValueType::Unsigned);
        assert_eq!(Value::from(0.5).value_type(), ValueType::Float);
        assert_eq!(
            Value::from(Duration::from_secs(3)).value_type(),
            ValueType::Duration
        );
        assert_eq!(
            Value::from(vec!["a".to_string()]).value_type(),
            ValueType::TextList
        );
    }

    #[test]
    fn test_value_serializes_with_type_tag() {
        let json = serde_json::to_value(Value::from("~/.pod")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "text", "value": "~/.pod"}));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("x").to_string(), "\"x\"");
        assert_eq!(Value::from(42i64).to_string(), "42");
        assert_eq!(Value::from(Duration::from_millis(1500)).to_string(), "1.5s");
    }
}
