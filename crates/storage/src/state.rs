//! Rows held by the in-memory store and their assembly into model objects
//!
//! Rows keep only ids for their references. Model objects handed back to
//! callers are assembled on every read, so a renamed Entity shows its new
//! name through every Attribute, Instance and RelationType that points at it.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use metakernel_core::{
    join_full_name, Attribute, AttributeId, AttributeType, AttributeValue, AttributeValueId,
    Cardinality, Entity, EntityId, EntityRef, Instance, InstanceId, InstanceRef, MetadataError,
    Relation, RelationId, RelationType, RelationTypeId, Result,
};

#[derive(Debug, Clone)]
pub(crate) struct EntityRow {
    pub version: u64,
    pub namespace: String,
    pub name: String,
}

impl EntityRow {
    pub fn full_name(&self) -> String {
        join_full_name(&self.namespace, &self.name)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AttributeRow {
    pub version: u64,
    pub entity: EntityId,
    pub name: String,
    pub attribute_type: Option<AttributeType>,
    pub sequence: u32,
    pub configuration: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct InstanceRow {
    pub version: u64,
    pub entity: EntityId,
}

#[derive(Debug, Clone)]
pub(crate) struct ValueRow {
    pub version: u64,
    pub attribute: AttributeId,
    pub instance: InstanceId,
    pub value: Option<JsonValue>,
}

#[derive(Debug, Clone)]
pub(crate) struct RelationTypeRow {
    pub version: u64,
    pub name: String,
    pub source_entity: EntityId,
    pub target_entity: EntityId,
    pub source_cardinality: Cardinality,
    pub target_cardinality: Cardinality,
    pub bidirectional: bool,
    pub reverse_name: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct RelationRow {
    pub version: u64,
    pub relation_type: RelationTypeId,
    pub source: InstanceId,
    pub target: InstanceId,
}

/// Everything the store holds
///
/// `BTreeMap`s keyed by id keep creation order, since ids only grow.
/// Cloned wholesale when a transaction begins.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryState {
    pub entities: BTreeMap<EntityId, EntityRow>,
    pub attributes: BTreeMap<AttributeId, AttributeRow>,
    pub instances: BTreeMap<InstanceId, InstanceRow>,
    pub values: BTreeMap<AttributeValueId, ValueRow>,
    pub relation_types: BTreeMap<RelationTypeId, RelationTypeRow>,
    pub relations: BTreeMap<RelationId, RelationRow>,
}

impl MemoryState {
    // ========================================================================
    // Assembly
    // ========================================================================

    pub fn entity_ref(&self, id: EntityId) -> EntityRef {
        match self.entities.get(&id) {
            Some(row) => EntityRef {
                id: Some(id),
                namespace: row.namespace.clone(),
                name: row.name.clone(),
            },
            None => EntityRef::by_id(id),
        }
    }

    pub fn instance_ref(&self, id: InstanceId) -> InstanceRef {
        InstanceRef {
            id: Some(id),
            entity: self
                .instances
                .get(&id)
                .map(|row| self.entity_ref(row.entity))
                .unwrap_or_default(),
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        let row = self.entities.get(&id)?;
        Some(Entity {
            id: Some(id),
            version: Some(row.version),
            namespace: row.namespace.clone(),
            name: row.name.clone(),
            attributes: self.attributes_of(id),
        })
    }

    pub fn attribute(&self, id: AttributeId) -> Option<Attribute> {
        let row = self.attributes.get(&id)?;
        Some(Attribute {
            id: Some(id),
            version: Some(row.version),
            entity: self.entity_ref(row.entity),
            name: row.name.clone(),
            attribute_type: row.attribute_type.clone(),
            sequence: Some(row.sequence),
            configuration: row.configuration.clone(),
        })
    }

    /// Attributes of an Entity, ordered by sequence
    pub fn attributes_of(&self, entity: EntityId) -> Vec<Attribute> {
        let mut rows: Vec<(&AttributeId, &AttributeRow)> = self
            .attributes
            .iter()
            .filter(|(_, row)| row.entity == entity)
            .collect();
        rows.sort_by_key(|(id, row)| (row.sequence, **id));
        rows.into_iter()
            .filter_map(|(id, _)| self.attribute(*id))
            .collect()
    }

    pub fn value(&self, id: AttributeValueId) -> Option<AttributeValue> {
        let row = self.values.get(&id)?;
        Some(AttributeValue {
            id: Some(id),
            version: Some(row.version),
            attribute: self
                .attribute(row.attribute)
                .unwrap_or_else(|| Attribute {
                    id: Some(row.attribute),
                    ..Attribute::default()
                }),
            instance: Some(self.instance_ref(row.instance)),
            value: row.value.clone(),
        })
    }

    pub fn values_of(&self, instance: InstanceId) -> Vec<AttributeValue> {
        self.values
            .iter()
            .filter(|(_, row)| row.instance == instance)
            .filter_map(|(id, _)| self.value(*id))
            .collect()
    }

    pub fn instance(&self, id: InstanceId) -> Option<Instance> {
        let row = self.instances.get(&id)?;
        Some(Instance {
            id: Some(id),
            version: Some(row.version),
            entity: Some(self.entity_ref(row.entity)),
            values: self.values_of(id),
        })
    }

    pub fn relation_type(&self, id: RelationTypeId) -> Option<RelationType> {
        let row = self.relation_types.get(&id)?;
        Some(RelationType {
            id: Some(id),
            version: Some(row.version),
            name: row.name.clone(),
            source_entity: Some(self.entity_ref(row.source_entity)),
            target_entity: Some(self.entity_ref(row.target_entity)),
            source_cardinality: Some(row.source_cardinality),
            target_cardinality: Some(row.target_cardinality),
            bidirectional: row.bidirectional,
            reverse_name: row.reverse_name.clone(),
        })
    }

    pub fn relation(&self, id: RelationId) -> Option<Relation> {
        let row = self.relations.get(&id)?;
        Some(Relation {
            id: Some(id),
            version: Some(row.version),
            relation_type: Some(row.relation_type),
            source: Some(self.instance_ref(row.source)),
            target: Some(self.instance_ref(row.target)),
        })
    }

    // ========================================================================
    // Sequences
    // ========================================================================

    /// Highest sequence among an Entity's Attributes, 0 when it has none
    pub fn max_sequence(&self, entity: EntityId) -> u32 {
        self.attributes
            .values()
            .filter(|row| row.entity == entity)
            .map(|row| row.sequence)
            .max()
            .unwrap_or(0)
    }

    /// Open a gap at `at` by moving every Attribute at or after it up one
    pub fn open_sequence_gap(&mut self, entity: EntityId, at: u32) {
        for row in self.attributes.values_mut() {
            if row.entity == entity && row.sequence >= at {
                row.sequence += 1;
            }
        }
    }

    /// Move one Attribute from `from` to `to`, shifting the ones in between
    pub fn move_sequence(&mut self, entity: EntityId, moving: AttributeId, from: u32, to: u32) {
        for (id, row) in self.attributes.iter_mut() {
            if row.entity != entity || *id == moving {
                continue;
            }
            if to < from && row.sequence >= to && row.sequence < from {
                row.sequence += 1;
            } else if to > from && row.sequence > from && row.sequence <= to {
                row.sequence -= 1;
            }
        }
    }

    // ========================================================================
    // References
    // ========================================================================

    pub fn require_entity(&self, entity: Option<&EntityRef>, what: &str) -> Result<EntityId> {
        match entity.and_then(|e| e.id) {
            Some(id) if self.entities.contains_key(&id) => Ok(id),
            Some(id) => Err(MetadataError::storage(format!(
                "{} references unknown Entity {}",
                what, id
            ))),
            None => Err(MetadataError::storage(format!(
                "{} requires a stored Entity",
                what
            ))),
        }
    }

    pub fn require_instance(&self, instance: Option<&InstanceRef>, what: &str) -> Result<InstanceId> {
        match instance.and_then(|i| i.id) {
            Some(id) if self.instances.contains_key(&id) => Ok(id),
            Some(id) => Err(MetadataError::storage(format!(
                "{} references unknown Instance {}",
                what, id
            ))),
            None => Err(MetadataError::storage(format!(
                "{} requires a stored Instance",
                what
            ))),
        }
    }
}

/// Fail when an update carries a version other than the stored one
pub(crate) fn check_version(carried: Option<u64>, stored: u64) -> Result<()> {
    match carried {
        Some(expected) if expected != stored => Err(MetadataError::VersionConflict {
            expected,
            actual: stored,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_attributes(sequences: &[u32]) -> MemoryState {
        let mut state = MemoryState::default();
        state.entities.insert(
            EntityId::new(1),
            EntityRow {
                version: 1,
                namespace: "default".into(),
                name: "foo".into(),
            },
        );
        for (i, seq) in sequences.iter().enumerate() {
            state.attributes.insert(
                AttributeId::new(10 + i as u64),
                AttributeRow {
                    version: 1,
                    entity: EntityId::new(1),
                    name: format!("a{}", i),
                    attribute_type: Some(AttributeType::Text),
                    sequence: *seq,
                    configuration: None,
                },
            );
        }
        state
    }

    fn sequences(state: &MemoryState) -> Vec<(String, u32)> {
        state
            .attributes_of(EntityId::new(1))
            .into_iter()
            .map(|a| (a.name, a.sequence.unwrap_or_default()))
            .collect()
    }

    #[test]
    fn test_open_gap_shifts_tail() {
        let mut state = state_with_attributes(&[1, 2, 3]);
        state.open_sequence_gap(EntityId::new(1), 2);
        assert_eq!(
            sequences(&state),
            vec![("a0".into(), 1), ("a1".into(), 3), ("a2".into(), 4)]
        );
    }

    #[test]
    fn test_move_down_and_up() {
        let mut state = state_with_attributes(&[1, 2, 3]);
        // a2 from 3 to 1
        state.move_sequence(EntityId::new(1), AttributeId::new(12), 3, 1);
        state.attributes.get_mut(&AttributeId::new(12)).unwrap().sequence = 1;
        assert_eq!(
            sequences(&state),
            vec![("a2".into(), 1), ("a0".into(), 2), ("a1".into(), 3)]
        );

        // a2 back from 1 to 3
        state.move_sequence(EntityId::new(1), AttributeId::new(12), 1, 3);
        state.attributes.get_mut(&AttributeId::new(12)).unwrap().sequence = 3;
        assert_eq!(
            sequences(&state),
            vec![("a0".into(), 1), ("a1".into(), 2), ("a2".into(), 3)]
        );
    }

    #[test]
    fn test_max_sequence() {
        assert_eq!(state_with_attributes(&[]).max_sequence(EntityId::new(1)), 0);
        assert_eq!(state_with_attributes(&[1, 2]).max_sequence(EntityId::new(1)), 2);
    }

    #[test]
    fn test_entity_ref_of_missing_entity() {
        let state = MemoryState::default();
        assert_eq!(state.entity_ref(EntityId::new(9)), EntityRef::by_id(EntityId::new(9)));
    }

    #[test]
    fn test_check_version() {
        assert!(check_version(None, 3).is_ok());
        assert!(check_version(Some(3), 3).is_ok());
        assert_eq!(
            check_version(Some(2), 3),
            Err(MetadataError::VersionConflict {
                expected: 2,
                actual: 3
            })
        );
    }
}
