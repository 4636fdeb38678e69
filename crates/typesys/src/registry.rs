//! Attribute type registry
//!
//! Maps an upper-case type name to its [`AttributeTypeDefinition`]. The
//! registry is built at startup and read-only afterwards; managers share it
//! through an `Arc`.
//!
//! ## Usage
//!
//! ```rust
//! use metakernel_typesys::{AttributeTypeDefinition, TypeRegistry, ValueKind};
//!
//! let mut registry = TypeRegistry::with_builtins();
//! registry.register(AttributeTypeDefinition::new("EMAIL", ValueKind::Text));
//!
//! assert!(registry.get("email").is_ok());
//! assert!(registry.get("color").is_err());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use metakernel_core::{AttributeType, MetadataError, Result};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::definition::AttributeTypeDefinition;

static GLOBAL: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::with_builtins);

/// Registry of attribute types
pub struct TypeRegistry {
    /// Definitions by upper-case name
    definitions: HashMap<String, Arc<AttributeTypeDefinition>>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        TypeRegistry {
            definitions: HashMap::new(),
        }
    }

    /// Create a registry holding TEXT, LONGTEXT, INTEGER, PASSWORD and OBJECT
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for definition in AttributeType::ALL
            .iter()
            .filter_map(AttributeTypeDefinition::builtin)
        {
            registry.register(definition);
        }
        registry
    }

    /// Process-wide registry of the built-in types
    pub fn global() -> &'static TypeRegistry {
        &GLOBAL
    }

    /// Register a definition, replacing any previous one with the same name
    pub fn register(
        &mut self,
        definition: AttributeTypeDefinition,
    ) -> Option<Arc<AttributeTypeDefinition>> {
        let name = definition.name().to_string();
        debug!(target: "metakernel::typesys", type_name = %name, "Registering attribute type");
        self.definitions.insert(name, Arc::new(definition))
    }

    /// Look up a definition by name, ignoring case
    pub fn get(&self, name: &str) -> Result<Arc<AttributeTypeDefinition>> {
        self.definitions
            .get(&name.to_ascii_uppercase())
            .cloned()
            .ok_or_else(|| MetadataError::UnknownType {
                name: name.to_string(),
            })
    }

    /// Look up the definition an Attribute's type names
    pub fn get_for(&self, attribute_type: &AttributeType) -> Result<Arc<AttributeTypeDefinition>> {
        self.get(attribute_type.name())
    }

    /// Check if a type is registered
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(&name.to_ascii_uppercase())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.definitions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered types
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_kind::ValueKind;

    #[test]
    fn test_builtins_registered() {
        let registry = TypeRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec!["INTEGER", "LONGTEXT", "OBJECT", "PASSWORD", "TEXT"]
        );
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_get_ignores_case() {
        let registry = TypeRegistry::with_builtins();
        assert_eq!(registry.get("text").unwrap().name(), "TEXT");
        assert_eq!(registry.get_for(&AttributeType::Password).unwrap().name(), "PASSWORD");
    }

    #[test]
    fn test_unknown_type() {
        let registry = TypeRegistry::new();
        assert!(registry.is_empty());
        let err = registry.get("TEXT").unwrap_err();
        assert_eq!(err.to_string(), "Unknown attribute type: TEXT");
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = TypeRegistry::with_builtins();
        let previous = registry.register(AttributeTypeDefinition::new("text", ValueKind::Any));
        assert!(previous.is_some());
        assert_eq!(registry.get("TEXT").unwrap().value_kind(), ValueKind::Any);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_get_for_custom_type() {
        let mut registry = TypeRegistry::with_builtins();
        let email = AttributeType::from_name("email");
        let err = registry.get_for(&email).unwrap_err();
        assert_eq!(err.to_string(), "Unknown attribute type: EMAIL");

        registry.register(AttributeTypeDefinition::new("EMAIL", ValueKind::Text));
        assert_eq!(registry.get_for(&email).unwrap().value_kind(), ValueKind::Text);
    }

    #[test]
    fn test_global_has_builtins() {
        assert!(TypeRegistry::global().contains("OBJECT"));
    }
}
