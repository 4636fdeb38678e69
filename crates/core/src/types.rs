//! Core identifier and enum types
//!
//! This module defines the foundational types:
//! - Typed ids for every stored kind (EntityId, AttributeId, ...)
//! - AttributeType: names the registered type definition of an Attribute
//! - Cardinality: ONE or MANY side of a RelationType

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw store-assigned id
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Raw numeric value
            pub const fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Store-assigned identifier of an Entity
    EntityId
);
define_id!(
    /// Store-assigned identifier of an Attribute
    AttributeId
);
define_id!(
    /// Store-assigned identifier of an Instance
    InstanceId
);
define_id!(
    /// Store-assigned identifier of an AttributeValue
    AttributeValueId
);
define_id!(
    /// Store-assigned identifier of a RelationType
    RelationTypeId
);
define_id!(
    /// Store-assigned identifier of a Relation
    RelationId
);

/// Type of an Attribute
///
/// Each value names a type definition in the type registry. The type
/// decides which configuration fields are legal and how values are checked.
/// It is fixed once the Attribute is created.
///
/// Types registered at runtime travel as [`AttributeType::Custom`]; they
/// serialize as their upper-case registry name like the built-ins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttributeType {
    /// Short text, optionally constrained by length and regex
    Text,
    /// Long text, constrained by length only
    LongText,
    /// Whole number, optionally bounded
    Integer,
    /// Secret text with composition rules
    Password,
    /// Arbitrary JSON value
    Object,
    /// A type registered under this upper-case name
    Custom(String),
}

impl AttributeType {
    /// All built-in attribute types
    pub const ALL: [AttributeType; 5] = [
        AttributeType::Text,
        AttributeType::LongText,
        AttributeType::Integer,
        AttributeType::Password,
        AttributeType::Object,
    ];

    /// Registry name of this type
    pub fn name(&self) -> &str {
        match self {
            AttributeType::Text => "TEXT",
            AttributeType::LongText => "LONGTEXT",
            AttributeType::Integer => "INTEGER",
            AttributeType::Password => "PASSWORD",
            AttributeType::Object => "OBJECT",
            AttributeType::Custom(name) => name,
        }
    }

    /// Type for a registry name (case-insensitive)
    ///
    /// Built-in names map to their variant; anything else is `Custom`.
    /// Whether the name is registered is checked by the type registry.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .unwrap_or_else(|| AttributeType::Custom(name.to_ascii_uppercase()))
    }

    /// Whether this is one of the built-in types
    pub fn is_builtin(&self) -> bool {
        !matches!(self, AttributeType::Custom(_))
    }
}

impl From<String> for AttributeType {
    fn from(name: String) -> Self {
        AttributeType::from_name(&name)
    }
}

impl From<&str> for AttributeType {
    fn from(name: &str) -> Self {
        AttributeType::from_name(name)
    }
}

impl From<AttributeType> for String {
    fn from(attribute_type: AttributeType) -> Self {
        attribute_type.name().to_string()
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How many edges of a RelationType an Instance may take part in on one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cardinality {
    /// At most one
    One,
    /// Any number
    Many,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::One => f.write_str("ONE"),
            Cardinality::Many => f.write_str("MANY"),
        }
    }
}
