//! Attribute values
//!
//! An attribute's resolved value depends on its style: scalar text, a flag,
//! an integer, an ordered list of names, or a string mapping.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Resolved value of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// No value was supplied and no default applies
    #[default]
    Missing,
    /// Free text or a single name
    Text(String),
    /// A flag
    Bool(bool),
    /// An integer (also used for ordering positions)
    Int(i64),
    /// An ordered list of items (names, tokens)
    List(Vec<String>),
    /// A string-to-string mapping
    Map(BTreeMap<String, String>),
}

impl AttributeValue {
    /// True if no value is present.
    pub fn is_missing(&self) -> bool {
        matches!(self, AttributeValue::Missing)
    }

    /// Borrow the text of a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Read an `Int` value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Borrow the items of a `List` value.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the entries of a `Map` value.
    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            AttributeValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Convert to a JSON value for catalog request bodies.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttributeValue::Missing => serde_json::Value::Null,
            AttributeValue::Text(s) => serde_json::Value::String(s.clone()),
            AttributeValue::Bool(b) => serde_json::Value::Bool(*b),
            AttributeValue::Int(i) => serde_json::Value::from(*i),
            AttributeValue::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|s| serde_json::Value::String(s.clone()))
                    .collect(),
            ),
            AttributeValue::Map(m) => serde_json::Value::Object(
                m.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for AttributeValue {
    /// Markdown-friendly rendering, used when echoing and rewriting blocks.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Missing => Ok(()),
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::List(items) => f.write_str(&items.join(", ")),
            AttributeValue::Map(m) => {
                let mut first = true;
                for (k, v) in m {
                    if !first {
                        f.write_str("\n")?;
                    }
                    first = false;
                    write!(f, "{}: {}", k, v)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Int(i)
    }
}
