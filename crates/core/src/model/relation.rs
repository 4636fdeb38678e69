use serde::{Deserialize, Serialize};

use crate::model::{EntityRef, InstanceRef};
use crate::types::{Cardinality, RelationId, RelationTypeId};

/// A declared, cardinality-constrained relationship kind between two Entities
///
/// `reverse_name` is required exactly when `bidirectional` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationType {
    /// Store-assigned id
    pub id: Option<RelationTypeId>,
    /// Optimistic version, assigned by the store
    pub version: Option<u64>,
    /// Name of the relationship, read from source to target
    #[serde(default)]
    pub name: String,
    /// Entity on the source side
    pub source_entity: Option<EntityRef>,
    /// Entity on the target side
    pub target_entity: Option<EntityRef>,
    /// Cardinality on the source side, ONE when unset at creation
    pub source_cardinality: Option<Cardinality>,
    /// Cardinality on the target side, ONE when unset at creation
    pub target_cardinality: Option<Cardinality>,
    /// Whether the relationship can be navigated from target to source
    #[serde(default)]
    pub bidirectional: bool,
    /// Name of the relationship, read from target to source
    pub reverse_name: Option<String>,
}

impl RelationType {
    /// Create an unsaved RelationType between two Entities
    pub fn new(name: impl Into<String>, source: EntityRef, target: EntityRef) -> Self {
        Self {
            name: name.into(),
            source_entity: Some(source),
            target_entity: Some(target),
            ..Self::default()
        }
    }

    /// Set both cardinalities
    pub fn with_cardinalities(mut self, source: Cardinality, target: Cardinality) -> Self {
        self.source_cardinality = Some(source);
        self.target_cardinality = Some(target);
        self
    }

    /// Make the relationship bidirectional under a reverse name
    pub fn with_reverse_name(mut self, reverse_name: impl Into<String>) -> Self {
        self.bidirectional = true;
        self.reverse_name = Some(reverse_name.into());
        self
    }
}

/// A concrete edge between a source Instance and a target Instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Store-assigned id
    pub id: Option<RelationId>,
    /// Optimistic version, assigned by the store
    pub version: Option<u64>,
    /// RelationType this edge conforms to
    pub relation_type: Option<RelationTypeId>,
    /// Source Instance
    pub source: Option<InstanceRef>,
    /// Target Instance
    pub target: Option<InstanceRef>,
}

impl Relation {
    /// Create an unsaved Relation
    pub fn new(relation_type: RelationTypeId, source: InstanceRef, target: InstanceRef) -> Self {
        Self {
            id: None,
            version: None,
            relation_type: Some(relation_type),
            source: Some(source),
            target: Some(target),
        }
    }
}
