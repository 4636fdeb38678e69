use serde::{Deserialize, Serialize};

use crate::model::EntityRef;
use crate::types::{AttributeId, AttributeType};

/// A named, typed, ordered field declared on an Entity
///
/// `sequence` is the 1-based position within the Entity. `configuration`
/// is a raw JSON object whose legal fields depend on `attribute_type`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Store-assigned id
    pub id: Option<AttributeId>,
    /// Optimistic version, assigned by the store
    pub version: Option<u64>,
    /// Owning Entity
    pub entity: EntityRef,
    /// Name, unique within the Entity ignoring case
    pub name: String,
    /// Type, fixed after creation
    #[serde(rename = "type")]
    pub attribute_type: Option<AttributeType>,
    /// 1-based position within the Entity
    pub sequence: Option<u32>,
    /// Raw JSON configuration document
    pub configuration: Option<String>,
}

impl Attribute {
    /// Create an unsaved Attribute with no sequence and no configuration
    pub fn new(entity: EntityRef, name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            id: None,
            version: None,
            entity,
            name: name.into(),
            attribute_type: Some(attribute_type),
            sequence: None,
            configuration: None,
        }
    }

    /// Set an explicit sequence
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Set the raw configuration document
    pub fn with_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = Some(configuration.into());
        self
    }

    /// Configuration, treating an empty string as absent
    pub fn configuration(&self) -> Option<&str> {
        self.configuration.as_deref().filter(|c| !c.trim().is_empty())
    }
}
