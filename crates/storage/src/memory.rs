//! MemoryStore: in-memory backend for every store contract
//!
//! This module implements the store traits using:
//! - `BTreeMap`s of rows keyed by typed ids (see [`crate::state`])
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicU64` for ids, shared by every kind so ids never collide
//! - A savepoint [`Journal`] for `begin`/`commit`/`rollback`
//!
//! # Design Notes
//!
//! - **No name uniqueness**: duplicate checks belong to the managers
//! - **Dense sequences**: Attribute inserts and moves shift their siblings
//! - **Optimistic versions**: `version = 1` on create, +1 per update
//! - **Store-wide transactions**: one thread at a time holds the journal;
//!   every call from another thread waits until that transaction ends, so a
//!   rollback only ever discards the owner's own writes
//! - **Lock order**: journal before state, always

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex, MutexGuard, RwLock};
use tracing::{debug, warn};

use metakernel_core::{
    Attribute, AttributeId, AttributeStore, AttributeValue, AttributeValueId, AttributeValueStore,
    Cardinality, Entity, EntityId, EntityStore, Instance, InstanceId, InstanceStore,
    MetadataError, MetadataStore, Relation, RelationId, RelationStore, RelationType,
    RelationTypeId, RelationTypeStore, Result,
};

use crate::journal::Journal;
use crate::state::{
    check_version, AttributeRow, EntityRow, InstanceRow, MemoryState, RelationRow,
    RelationTypeRow, ValueRow,
};

/// Number of rows of each kind, for diagnostics and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Stored Entities
    pub entities: usize,
    /// Stored Attributes
    pub attributes: usize,
    /// Stored Instances
    pub instances: usize,
    /// Stored AttributeValues
    pub values: usize,
    /// Stored RelationTypes
    pub relation_types: usize,
    /// Stored Relations
    pub relations: usize,
}

/// In-memory implementation of [`MetadataStore`]
///
/// Thread-safe through `parking_lot` locks and an `AtomicU64` id counter.
/// Every call takes the state lock once, so each call is atomic on its own.
#[derive(Debug)]
pub struct MemoryStore {
    /// All rows
    state: RwLock<MemoryState>,
    /// Savepoints of open transactions
    journal: Mutex<Journal>,
    /// Signalled when a transaction ends
    turn: Condvar,
    /// Last assigned id
    next_id: AtomicU64,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            journal: Mutex::new(Journal::default()),
            turn: Condvar::new(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Allocate the next id atomically
    ///
    /// Ids start at 1 and are never reused, even after a rollback.
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Lock the journal once no other thread has a transaction open
    ///
    /// Held for the whole call, so no transaction can begin or end halfway
    /// through it.
    fn wait_turn(&self) -> MutexGuard<'_, Journal> {
        let mut journal = self.journal.lock();
        while journal.is_held_by_other() {
            self.turn.wait(&mut journal);
        }
        journal
    }

    /// Wake waiting callers once the outermost transaction has ended
    fn hand_over(&self, journal: &Journal) {
        if journal.depth() == 0 {
            self.turn.notify_all();
        }
    }

    /// Row counts per kind
    pub fn stats(&self) -> StoreStats {
        let state = self.state.read();
        StoreStats {
            entities: state.entities.len(),
            attributes: state.attributes.len(),
            instances: state.instances.len(),
            values: state.values.len(),
            relation_types: state.relation_types.len(),
            relations: state.relations.len(),
        }
    }

    /// Number of open transactions
    pub fn transaction_depth(&self) -> usize {
        self.journal.lock().depth()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn vanished(kind: &str, id: impl std::fmt::Display) -> MetadataError {
    MetadataError::storage(format!("{} {} vanished during write", kind, id))
}

fn id_required(kind: &str) -> MetadataError {
    MetadataError::storage(format!("{} update requires an id", kind))
}

// ============================================================================
// Entities
// ============================================================================

impl EntityStore for MemoryStore {
    fn create(&self, entity: &Entity) -> Result<Entity> {
        let _turn = self.wait_turn();
        let id = EntityId::new(self.next_id());
        let mut state = self.state.write();
        state.entities.insert(
            id,
            EntityRow {
                version: 1,
                namespace: entity.namespace.clone(),
                name: entity.name.clone(),
            },
        );
        debug!(target: "metakernel::store", entity_id = %id, "Stored entity");
        state.entity(id).ok_or_else(|| vanished("Entity", id))
    }

    fn update(&self, entity: &Entity) -> Result<Entity> {
        let _turn = self.wait_turn();
        let id = entity.id.ok_or_else(|| id_required("Entity"))?;
        let mut state = self.state.write();
        let row = state
            .entities
            .get_mut(&id)
            .ok_or_else(|| MetadataError::EntityNotFound { key: id.to_string() })?;
        check_version(entity.version, row.version)?;
        row.namespace = entity.namespace.clone();
        row.name = entity.name.clone();
        row.version += 1;
        debug!(target: "metakernel::store", entity_id = %id, version = row.version, "Updated entity");
        state.entity(id).ok_or_else(|| vanished("Entity", id))
    }

    fn find_by_id(&self, id: EntityId) -> Result<Option<Entity>> {
        let _turn = self.wait_turn();
        Ok(self.state.read().entity(id))
    }

    fn find_by_full_name(&self, full_name: &str) -> Result<Option<Entity>> {
        let _turn = self.wait_turn();
        let state = self.state.read();
        let id = state
            .entities
            .iter()
            .find(|(_, row)| row.full_name() == full_name)
            .map(|(id, _)| *id);
        Ok(id.and_then(|id| state.entity(id)))
    }

    fn list_all(&self) -> Result<Vec<Entity>> {
        let _turn = self.wait_turn();
        let state = self.state.read();
        Ok(state
            .entities
            .keys()
            .filter_map(|id| state.entity(*id))
            .collect())
    }

    fn list_by_full_name(&self, fragment: &str) -> Result<Vec<Entity>> {
        let _turn = self.wait_turn();
        let fragment = fragment.to_lowercase();
        let state = self.state.read();
        Ok(state
            .entities
            .iter()
            .filter(|(_, row)| row.full_name().to_lowercase().contains(&fragment))
            .filter_map(|(id, _)| state.entity(*id))
            .collect())
    }

    fn delete(&self, id: EntityId) -> Result<()> {
        let _turn = self.wait_turn();
        let mut state = self.state.write();
        let referenced = state.instances.values().any(|row| row.entity == id)
            || state
                .relation_types
                .values()
                .any(|row| row.source_entity == id || row.target_entity == id);
        if referenced {
            return Err(MetadataError::storage(format!(
                "Entity {} is still referenced",
                id
            )));
        }
        state.attributes.retain(|_, row| row.entity != id);
        if state.entities.remove(&id).is_some() {
            debug!(target: "metakernel::store", entity_id = %id, "Deleted entity");
        }
        Ok(())
    }
}

// ============================================================================
// Attributes
// ============================================================================

impl AttributeStore for MemoryStore {
    fn create(&self, attribute: &Attribute) -> Result<Attribute> {
        let _turn = self.wait_turn();
        let id = AttributeId::new(self.next_id());
        let mut state = self.state.write();
        let entity = state.require_entity(Some(&attribute.entity), "Attribute")?;
        let next = state.max_sequence(entity) + 1;
        let sequence = attribute.sequence.unwrap_or(next);
        if sequence == 0 || sequence > next {
            return Err(MetadataError::storage(format!(
                "Attribute sequence {} outside 1..={}",
                sequence, next
            )));
        }
        state.open_sequence_gap(entity, sequence);
        state.attributes.insert(
            id,
            AttributeRow {
                version: 1,
                entity,
                name: attribute.name.clone(),
                attribute_type: attribute.attribute_type.clone(),
                sequence,
                configuration: attribute.configuration.clone(),
            },
        );
        debug!(target: "metakernel::store", attribute_id = %id, sequence, "Stored attribute");
        state.attribute(id).ok_or_else(|| vanished("Attribute", id))
    }

    fn update(&self, attribute: &Attribute) -> Result<Attribute> {
        let _turn = self.wait_turn();
        let id = attribute.id.ok_or_else(|| id_required("Attribute"))?;
        let mut state = self.state.write();
        let (entity, from, stored_version) = match state.attributes.get(&id) {
            Some(row) => (row.entity, row.sequence, row.version),
            None => return Err(MetadataError::AttributeNotFound { id: id.as_u64() }),
        };
        check_version(attribute.version, stored_version)?;

        let max = state.max_sequence(entity);
        let to = attribute.sequence.unwrap_or(from);
        if to == 0 || to > max {
            return Err(MetadataError::storage(format!(
                "Attribute sequence {} outside 1..={}",
                to, max
            )));
        }
        if to != from {
            state.move_sequence(entity, id, from, to);
        }

        let row = state
            .attributes
            .get_mut(&id)
            .ok_or_else(|| vanished("Attribute", id))?;
        row.name = attribute.name.clone();
        if attribute.attribute_type.is_some() {
            row.attribute_type = attribute.attribute_type.clone();
        }
        row.sequence = to;
        row.configuration = attribute.configuration.clone();
        row.version += 1;
        debug!(target: "metakernel::store", attribute_id = %id, from, to, "Updated attribute");
        state.attribute(id).ok_or_else(|| vanished("Attribute", id))
    }

    fn find_by_id(&self, id: AttributeId) -> Result<Option<Attribute>> {
        let _turn = self.wait_turn();
        Ok(self.state.read().attribute(id))
    }

    fn find_by_name_and_entity_full_name(
        &self,
        name: &str,
        entity_full_name: &str,
    ) -> Result<Option<Attribute>> {
        let _turn = self.wait_turn();
        let state = self.state.read();
        let Some(entity) = state
            .entities
            .iter()
            .find(|(_, row)| row.full_name() == entity_full_name)
            .map(|(id, _)| *id)
        else {
            return Ok(None);
        };
        let id = state
            .attributes
            .iter()
            .find(|(_, row)| row.entity == entity && row.name.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id);
        Ok(id.and_then(|id| state.attribute(id)))
    }

    fn list_by_entity_id(&self, entity_id: EntityId) -> Result<Vec<Attribute>> {
        let _turn = self.wait_turn();
        Ok(self.state.read().attributes_of(entity_id))
    }
}

// ============================================================================
// Instances and values
// ============================================================================

impl InstanceStore for MemoryStore {
    fn create(&self, instance: &Instance) -> Result<Instance> {
        let _turn = self.wait_turn();
        let id = InstanceId::new(self.next_id());
        let mut state = self.state.write();
        let entity = state.require_entity(instance.entity.as_ref(), "Instance")?;
        state.instances.insert(id, InstanceRow { version: 1, entity });
        debug!(target: "metakernel::store", instance_id = %id, entity_id = %entity, "Stored instance");
        state.instance(id).ok_or_else(|| vanished("Instance", id))
    }

    fn update(&self, instance: &Instance) -> Result<Instance> {
        let _turn = self.wait_turn();
        let id = instance.id.ok_or_else(|| id_required("Instance"))?;
        let mut state = self.state.write();
        let entity = match instance.entity.as_ref() {
            Some(entity) => Some(state.require_entity(Some(entity), "Instance")?),
            None => None,
        };
        let row = state
            .instances
            .get_mut(&id)
            .ok_or_else(|| MetadataError::storage(format!("Instance {} not found", id)))?;
        check_version(instance.version, row.version)?;
        if let Some(entity) = entity {
            row.entity = entity;
        }
        row.version += 1;
        state.instance(id).ok_or_else(|| vanished("Instance", id))
    }

    fn find_by_id(&self, id: InstanceId) -> Result<Option<Instance>> {
        let _turn = self.wait_turn();
        Ok(self.state.read().instance(id))
    }

    fn list_by_entity_id(&self, entity_id: EntityId) -> Result<Vec<Instance>> {
        let _turn = self.wait_turn();
        let state = self.state.read();
        Ok(state
            .instances
            .iter()
            .filter(|(_, row)| row.entity == entity_id)
            .filter_map(|(id, _)| state.instance(*id))
            .collect())
    }

    fn delete(&self, id: InstanceId) -> Result<()> {
        let _turn = self.wait_turn();
        let mut state = self.state.write();
        state.values.retain(|_, row| row.instance != id);
        let before = state.relations.len();
        state
            .relations
            .retain(|_, row| row.source != id && row.target != id);
        let dropped = before - state.relations.len();
        if dropped > 0 {
            warn!(target: "metakernel::store", instance_id = %id, relations = dropped, "Dropped relations of deleted instance");
        }
        state.instances.remove(&id);
        Ok(())
    }
}

impl AttributeValueStore for MemoryStore {
    fn create(&self, value: &AttributeValue) -> Result<AttributeValue> {
        let _turn = self.wait_turn();
        let id = AttributeValueId::new(self.next_id());
        let mut state = self.state.write();
        let instance = state.require_instance(value.instance.as_ref(), "AttributeValue")?;
        let attribute = match value.attribute.id {
            Some(attribute) if state.attributes.contains_key(&attribute) => attribute,
            _ => {
                return Err(MetadataError::storage(
                    "AttributeValue requires a stored Attribute",
                ))
            }
        };
        state.values.insert(
            id,
            ValueRow {
                version: 1,
                attribute,
                instance,
                value: value.value.clone(),
            },
        );
        state.value(id).ok_or_else(|| vanished("AttributeValue", id))
    }

    fn list_by_instance_id(&self, instance_id: InstanceId) -> Result<Vec<AttributeValue>> {
        let _turn = self.wait_turn();
        Ok(self.state.read().values_of(instance_id))
    }
}

// ============================================================================
// Relation types and relations
// ============================================================================

impl RelationTypeStore for MemoryStore {
    fn create(&self, relation_type: &RelationType) -> Result<RelationType> {
        let _turn = self.wait_turn();
        let id = RelationTypeId::new(self.next_id());
        let mut state = self.state.write();
        let source_entity =
            state.require_entity(relation_type.source_entity.as_ref(), "RelationType source")?;
        let target_entity =
            state.require_entity(relation_type.target_entity.as_ref(), "RelationType target")?;
        state.relation_types.insert(
            id,
            RelationTypeRow {
                version: 1,
                name: relation_type.name.clone(),
                source_entity,
                target_entity,
                source_cardinality: relation_type.source_cardinality.unwrap_or(Cardinality::One),
                target_cardinality: relation_type.target_cardinality.unwrap_or(Cardinality::One),
                bidirectional: relation_type.bidirectional,
                reverse_name: relation_type.reverse_name.clone(),
            },
        );
        debug!(target: "metakernel::store", relation_type_id = %id, "Stored relation type");
        state
            .relation_type(id)
            .ok_or_else(|| vanished("RelationType", id))
    }

    fn update(&self, relation_type: &RelationType) -> Result<RelationType> {
        let _turn = self.wait_turn();
        let id = relation_type.id.ok_or_else(|| id_required("RelationType"))?;
        let mut state = self.state.write();
        let source_entity = match relation_type.source_entity.as_ref() {
            Some(entity) => Some(state.require_entity(Some(entity), "RelationType source")?),
            None => None,
        };
        let target_entity = match relation_type.target_entity.as_ref() {
            Some(entity) => Some(state.require_entity(Some(entity), "RelationType target")?),
            None => None,
        };
        let row = state
            .relation_types
            .get_mut(&id)
            .ok_or(MetadataError::RelationTypeNotFound { id: id.as_u64() })?;
        check_version(relation_type.version, row.version)?;
        row.name = relation_type.name.clone();
        if let Some(entity) = source_entity {
            row.source_entity = entity;
        }
        if let Some(entity) = target_entity {
            row.target_entity = entity;
        }
        if let Some(cardinality) = relation_type.source_cardinality {
            row.source_cardinality = cardinality;
        }
        if let Some(cardinality) = relation_type.target_cardinality {
            row.target_cardinality = cardinality;
        }
        row.bidirectional = relation_type.bidirectional;
        row.reverse_name = relation_type.reverse_name.clone();
        row.version += 1;
        state
            .relation_type(id)
            .ok_or_else(|| vanished("RelationType", id))
    }

    fn find_by_id(&self, id: RelationTypeId) -> Result<Option<RelationType>> {
        let _turn = self.wait_turn();
        Ok(self.state.read().relation_type(id))
    }

    fn list_all(&self) -> Result<Vec<RelationType>> {
        let _turn = self.wait_turn();
        let state = self.state.read();
        Ok(state
            .relation_types
            .keys()
            .filter_map(|id| state.relation_type(*id))
            .collect())
    }

    fn delete(&self, id: RelationTypeId) -> Result<()> {
        let _turn = self.wait_turn();
        let mut state = self.state.write();
        state.relations.retain(|_, row| row.relation_type != id);
        state.relation_types.remove(&id);
        Ok(())
    }
}

impl RelationStore for MemoryStore {
    fn create(&self, relation: &Relation) -> Result<Relation> {
        let _turn = self.wait_turn();
        let id = RelationId::new(self.next_id());
        let mut state = self.state.write();
        let relation_type = match relation.relation_type {
            Some(rt) if state.relation_types.contains_key(&rt) => rt,
            Some(rt) => return Err(MetadataError::RelationTypeNotFound { id: rt.as_u64() }),
            None => {
                return Err(MetadataError::storage(
                    "Relation requires a stored RelationType",
                ))
            }
        };
        let source = state.require_instance(relation.source.as_ref(), "Relation source")?;
        let target = state.require_instance(relation.target.as_ref(), "Relation target")?;
        state.relations.insert(
            id,
            RelationRow {
                version: 1,
                relation_type,
                source,
                target,
            },
        );
        debug!(target: "metakernel::store", relation_id = %id, "Stored relation");
        state.relation(id).ok_or_else(|| vanished("Relation", id))
    }

    fn update(&self, relation: &Relation) -> Result<Relation> {
        let _turn = self.wait_turn();
        let id = relation.id.ok_or_else(|| id_required("Relation"))?;
        let mut state = self.state.write();
        let source = match relation.source.as_ref() {
            Some(source) => Some(state.require_instance(Some(source), "Relation source")?),
            None => None,
        };
        let target = match relation.target.as_ref() {
            Some(target) => Some(state.require_instance(Some(target), "Relation target")?),
            None => None,
        };
        if let Some(rt) = relation.relation_type {
            if !state.relation_types.contains_key(&rt) {
                return Err(MetadataError::RelationTypeNotFound { id: rt.as_u64() });
            }
        }
        let row = state
            .relations
            .get_mut(&id)
            .ok_or(MetadataError::RelationNotFound { id: id.as_u64() })?;
        check_version(relation.version, row.version)?;
        if let Some(rt) = relation.relation_type {
            row.relation_type = rt;
        }
        if let Some(source) = source {
            row.source = source;
        }
        if let Some(target) = target {
            row.target = target;
        }
        row.version += 1;
        state.relation(id).ok_or_else(|| vanished("Relation", id))
    }

    fn find_by_id(&self, id: RelationId) -> Result<Option<Relation>> {
        let _turn = self.wait_turn();
        Ok(self.state.read().relation(id))
    }

    fn list_all(&self) -> Result<Vec<Relation>> {
        let _turn = self.wait_turn();
        let state = self.state.read();
        Ok(state
            .relations
            .keys()
            .filter_map(|id| state.relation(*id))
            .collect())
    }

    fn list_by_relation_type(&self, relation_type: RelationTypeId) -> Result<Vec<Relation>> {
        let _turn = self.wait_turn();
        let state = self.state.read();
        Ok(state
            .relations
            .iter()
            .filter(|(_, row)| row.relation_type == relation_type)
            .filter_map(|(id, _)| state.relation(*id))
            .collect())
    }

    fn list_by_source_instance(&self, instance: InstanceId) -> Result<Vec<Relation>> {
        let _turn = self.wait_turn();
        let state = self.state.read();
        Ok(state
            .relations
            .iter()
            .filter(|(_, row)| row.source == instance)
            .filter_map(|(id, _)| state.relation(*id))
            .collect())
    }

    fn delete(&self, id: RelationId) -> Result<()> {
        let _turn = self.wait_turn();
        if self.state.write().relations.remove(&id).is_some() {
            debug!(target: "metakernel::store", relation_id = %id, "Deleted relation");
        }
        Ok(())
    }
}

// ============================================================================
// Bundle and transactions
// ============================================================================

impl MetadataStore for MemoryStore {
    fn entities(&self) -> &dyn EntityStore {
        self
    }

    fn attributes(&self) -> &dyn AttributeStore {
        self
    }

    fn instances(&self) -> &dyn InstanceStore {
        self
    }

    fn attribute_values(&self) -> &dyn AttributeValueStore {
        self
    }

    fn relation_types(&self) -> &dyn RelationTypeStore {
        self
    }

    fn relations(&self) -> &dyn RelationStore {
        self
    }

    fn begin(&self) -> Result<()> {
        let mut journal = self.wait_turn();
        journal.begin(&self.state.read());
        debug!(target: "metakernel::store", depth = journal.depth(), "Transaction started");
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let mut journal = self.journal.lock();
        journal.commit()?;
        debug!(target: "metakernel::store", depth = journal.depth(), "Transaction committed");
        self.hand_over(&journal);
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        let mut journal = self.journal.lock();
        let savepoint = journal.rollback()?;
        *self.state.write() = savepoint;
        warn!(target: "metakernel::store", depth = journal.depth(), "Transaction rolled back");
        self.hand_over(&journal);
        Ok(())
    }
}
