//! Owned values crossing the interpreter boundary
//!
//! Arguments, pre-bound identifiers, collaborator results and the final
//! result of a call are all `HostValue`s. They own their contents, so they
//! outlive the per-call heap that arrays and objects live in while running.

use super::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::decimal::Decimal;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Number(Decimal),
    NaN,
    String(String),
    Boolean(bool),
    Null,
    Undefined,
    Array(Vec<HostValue>),
    /// Properties in insertion order, keys unique
    Object(Vec<(String, HostValue)>),
}

impl HostValue {
    pub fn number(value: impl Into<Decimal>) -> Self {
        HostValue::Number(value.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        HostValue::String(value.into())
    }

    /// Build an object, keeping the first position and the last value of a repeated key
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, HostValue)>) -> Self {
        let mut props: Vec<(String, HostValue)> = Vec::new();
        for (key, value) in entries {
            let key = key.into();
            match props.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => props.push((key, value)),
            }
        }
        HostValue::Object(props)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Property of an object, `None` for other values or a missing key
    pub fn get(&self, key: &str) -> Option<&HostValue> {
        match self {
            HostValue::Object(props) => props.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Convert a JSON document into a host value. Numbers go through the decimal parser.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => HostValue::Null,
            Value::Bool(b) => HostValue::Boolean(*b),
            Value::Number(n) => match Decimal::parse(&n.to_string()) {
                Some(d) => HostValue::Number(d),
                None => HostValue::NaN,
            },
            Value::String(s) => HostValue::String(s.clone()),
            Value::Array(items) => HostValue::Array(items.iter().map(HostValue::from_json).collect()),
            Value::Object(map) => HostValue::object(map.iter().map(|(k, v)| (k.clone(), HostValue::from_json(v)))),
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::String(s) => write_quoted(f, s),
            HostValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    item.fmt_child(f)?;
                }
                write!(f, "]")
            }
            HostValue::Object(props) => {
                write!(f, "{{")?;
                for (i, (key, value)) in props.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write_quoted(f, key)?;
                    write!(f, ":")?;
                    value.fmt_child(f)?;
                }
                write!(f, "}}")
            }
            scalar => write!(f, "{scalar}"),
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.fmt_nested(f))
    }
}

/// Nested values are released from an explicit worklist, so dropping a
/// deeply nested result does not recurse
impl Drop for HostValue {
    fn drop(&mut self) {
        let mut pending = match self {
            HostValue::Array(items) if !items.is_empty() => std::mem::take(items),
            HostValue::Object(props) if !props.is_empty() => props.drain(..).map(|(_, v)| v).collect(),
            _ => return,
        };
        while let Some(mut value) = pending.pop() {
            match &mut value {
                HostValue::Array(items) => pending.append(items),
                HostValue::Object(props) => pending.extend(props.drain(..).map(|(_, v)| v)),
                _ => {}
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}

/// Result serialization: a top-level string prints raw, nested strings are quoted
impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Number(n) => write!(f, "{n}"),
            HostValue::NaN => write!(f, "NaN"),
            HostValue::String(s) => write!(f, "{s}"),
            HostValue::Boolean(b) => write!(f, "{b}"),
            HostValue::Null => write!(f, "null"),
            HostValue::Undefined => write!(f, "undefined"),
            HostValue::Array(_) | HostValue::Object(_) => self.fmt_nested(f),
        }
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::String(s.to_string())
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Boolean(b)
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Number(n.into())
    }
}
