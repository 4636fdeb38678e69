//! Underlying value classes of attribute types

use serde_json::Value as JsonValue;

/// Primitive class a value or configuration field must belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// JSON string
    Text,
    /// Whole number fitting in an `i64`
    Integer,
    /// JSON boolean
    Boolean,
    /// Anything
    Any,
}

impl ValueKind {
    /// Strict membership, used for configuration fields
    pub fn matches(&self, value: &JsonValue) -> bool {
        match self {
            ValueKind::Text => value.is_string(),
            ValueKind::Integer => value.as_i64().is_some(),
            ValueKind::Boolean => value.is_boolean(),
            ValueKind::Any => true,
        }
    }

    /// Lenient membership, used for Instance values
    ///
    /// Integers also accept strings that parse as an `i64`.
    pub fn coerces(&self, value: &JsonValue) -> bool {
        match self {
            ValueKind::Integer => as_integer(value).is_some(),
            _ => self.matches(value),
        }
    }

    /// Article and noun used in messages
    pub fn describe(&self) -> &'static str {
        match self {
            ValueKind::Text => "a text",
            ValueKind::Integer => "an integer",
            ValueKind::Boolean => "a boolean",
            ValueKind::Any => "a value",
        }
    }
}

/// Read a value as an integer, parsing numeric strings
pub fn as_integer(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
