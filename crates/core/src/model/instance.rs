use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::model::{Attribute, EntityRef};
use crate::types::{AttributeValueId, InstanceId};

/// A concrete record conforming to an Entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Store-assigned id
    pub id: Option<InstanceId>,
    /// Optimistic version, assigned by the store
    pub version: Option<u64>,
    /// Entity this Instance conforms to
    pub entity: Option<EntityRef>,
    /// One value per distinct Attribute
    #[serde(default)]
    pub values: Vec<AttributeValue>,
}

impl Instance {
    /// Create an unsaved Instance of an Entity
    pub fn new(entity: EntityRef) -> Self {
        Self {
            id: None,
            version: None,
            entity: Some(entity),
            values: Vec::new(),
        }
    }

    /// Add a value for an Attribute
    pub fn with_value(mut self, attribute: &Attribute, value: Option<JsonValue>) -> Self {
        self.values.push(AttributeValue::new(attribute.clone(), value));
        self
    }

    /// Back-reference to this Instance
    ///
    /// An Instance without an Entity yields a reference with an empty Entity.
    pub fn to_ref(&self) -> InstanceRef {
        InstanceRef {
            id: self.id,
            entity: self.entity.clone().unwrap_or_default(),
        }
    }

    /// Value stored for the named Attribute, ignoring case
    pub fn value_of(&self, attribute: &str) -> Option<&JsonValue> {
        self.values
            .iter()
            .find(|v| v.attribute.name.eq_ignore_ascii_case(attribute))
            .and_then(|v| v.value.as_ref())
    }
}

/// Lightweight reference to an Instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceRef {
    /// Id of the referenced Instance
    pub id: Option<InstanceId>,
    /// Entity of the referenced Instance
    #[serde(default)]
    pub entity: EntityRef,
}

impl InstanceRef {
    /// Reference an Instance by id only
    pub fn by_id(id: InstanceId) -> Self {
        Self {
            id: Some(id),
            entity: EntityRef::default(),
        }
    }
}

/// One Attribute's value on one Instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue {
    /// Store-assigned id
    pub id: Option<AttributeValueId>,
    /// Optimistic version, assigned by the store
    pub version: Option<u64>,
    /// Attribute this value is for
    pub attribute: Attribute,
    /// Owning Instance, set when the value is persisted
    pub instance: Option<InstanceRef>,
    /// Raw value; `None` means unset
    pub value: Option<JsonValue>,
}

impl AttributeValue {
    /// Create an unsaved value
    pub fn new(attribute: Attribute, value: Option<JsonValue>) -> Self {
        Self {
            id: None,
            version: None,
            attribute,
            instance: None,
            value,
        }
    }
}
