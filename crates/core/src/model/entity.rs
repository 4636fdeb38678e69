use serde::{Deserialize, Serialize};

use crate::model::Attribute;
use crate::naming::join_full_name;
use crate::types::EntityId;

/// A user-declared class in the metadata model
///
/// Identified by `(namespace, name)`, both stored lower-case. An empty
/// namespace means "no explicit namespace"; the store persists a default
/// token in its place.
///
/// `attributes` is filled in by the store, ordered by sequence. Updates to an
/// Entity never change its Attributes; those go through the Attribute manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Store-assigned id
    pub id: Option<EntityId>,
    /// Optimistic version, assigned by the store
    pub version: Option<u64>,
    /// Namespace, possibly empty
    #[serde(default)]
    pub namespace: String,
    /// Name, unique within the namespace
    pub name: String,
    /// Attributes in sequence order
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Entity {
    /// Create an unsaved Entity
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            version: None,
            namespace: namespace.into(),
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// `namespace.name`, or just `name` when the namespace is empty
    pub fn full_name(&self) -> String {
        join_full_name(&self.namespace, &self.name)
    }

    /// Back-reference to this Entity
    pub fn to_ref(&self) -> EntityRef {
        EntityRef {
            id: self.id,
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    /// Find an Attribute by name, ignoring case
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Highest sequence among the Attributes
    pub fn max_sequence(&self) -> Option<u32> {
        self.attributes.iter().filter_map(|a| a.sequence).max()
    }
}

/// Lightweight reference to an Entity
///
/// Carries the id used for resolution plus the names used in messages and
/// namespace decoration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Id of the referenced Entity
    pub id: Option<EntityId>,
    /// Namespace of the referenced Entity
    #[serde(default)]
    pub namespace: String,
    /// Name of the referenced Entity
    #[serde(default)]
    pub name: String,
}

impl EntityRef {
    /// Reference an Entity by id only
    pub fn by_id(id: EntityId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// `namespace.name`, or just `name` when the namespace is empty
    pub fn full_name(&self) -> String {
        join_full_name(&self.namespace, &self.name)
    }
}

impl From<&Entity> for EntityRef {
    fn from(entity: &Entity) -> Self {
        entity.to_ref()
    }
}
