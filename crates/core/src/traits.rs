//! Store contracts consumed by the kernel
//!
//! The kernel never touches storage directly. Each kind of object has a small
//! store trait; [`MetadataStore`] bundles them with transaction hooks so a
//! backend can be swapped without touching the managers.
//!
//! ## Contract
//!
//! - Every call is atomic on its own; ordering across calls is the caller's job
//! - `create` assigns the id and sets `version = 1`
//! - `update` bumps the version and fails with `VersionConflict` when the
//!   update carries a version that differs from the stored one
//! - `find_*` returns `Ok(None)` on a miss; errors are reserved for store failures
//! - Lists come back in creation order unless stated otherwise
//! - Full names are compared exactly; callers normalize case and namespace
//!
//! Thread safety: All methods must be safe to call concurrently from
//! multiple threads (requires Send + Sync).

use crate::error::Result;
use crate::model::{Attribute, AttributeValue, Entity, Instance, Relation, RelationType};
use crate::types::{AttributeId, EntityId, InstanceId, RelationId, RelationTypeId};

/// Storage for Entities
pub trait EntityStore: Send + Sync {
    /// Persist a new Entity; its `attributes` are ignored
    fn create(&self, entity: &Entity) -> Result<Entity>;

    /// Persist changes to namespace and name; `attributes` are ignored
    fn update(&self, entity: &Entity) -> Result<Entity>;

    /// Look up by id, with Attributes ordered by sequence
    fn find_by_id(&self, id: EntityId) -> Result<Option<Entity>>;

    /// Look up by exact `namespace.name`
    fn find_by_full_name(&self, full_name: &str) -> Result<Option<Entity>>;

    /// All Entities
    fn list_all(&self) -> Result<Vec<Entity>>;

    /// Entities whose full name contains `fragment`, ignoring case
    fn list_by_full_name(&self, fragment: &str) -> Result<Vec<Entity>>;

    /// Remove an Entity and its Attributes
    fn delete(&self, id: EntityId) -> Result<()>;
}

/// Storage for Attributes
///
/// The store keeps sequences dense within an Entity: creating at position
/// `k` shifts Attributes at `k` and above up by one, and moving an Attribute
/// on update shifts the Attributes in between.
pub trait AttributeStore: Send + Sync {
    /// Persist a new Attribute at its sequence
    fn create(&self, attribute: &Attribute) -> Result<Attribute>;

    /// Persist changes; the owning Entity never changes
    fn update(&self, attribute: &Attribute) -> Result<Attribute>;

    /// Look up by id
    fn find_by_id(&self, id: AttributeId) -> Result<Option<Attribute>>;

    /// Look up by name (ignoring case) within the Entity with this exact full name
    fn find_by_name_and_entity_full_name(
        &self,
        name: &str,
        entity_full_name: &str,
    ) -> Result<Option<Attribute>>;

    /// Attributes of an Entity ordered by sequence
    fn list_by_entity_id(&self, entity_id: EntityId) -> Result<Vec<Attribute>>;
}

/// Storage for Instances
pub trait InstanceStore: Send + Sync {
    /// Persist the Instance shell; `values` are ignored
    fn create(&self, instance: &Instance) -> Result<Instance>;

    /// Persist changes to the shell; `values` are ignored
    fn update(&self, instance: &Instance) -> Result<Instance>;

    /// Look up by id, with its values
    fn find_by_id(&self, id: InstanceId) -> Result<Option<Instance>>;

    /// All Instances of an Entity
    fn list_by_entity_id(&self, entity_id: EntityId) -> Result<Vec<Instance>>;

    /// Remove an Instance and its values
    fn delete(&self, id: InstanceId) -> Result<()>;
}

/// Storage for AttributeValues
pub trait AttributeValueStore: Send + Sync {
    /// Persist a value; `instance` must reference a stored Instance
    fn create(&self, value: &AttributeValue) -> Result<AttributeValue>;

    /// Values of an Instance
    fn list_by_instance_id(&self, instance_id: InstanceId) -> Result<Vec<AttributeValue>>;
}

/// Storage for RelationTypes
pub trait RelationTypeStore: Send + Sync {
    /// Persist a new RelationType
    fn create(&self, relation_type: &RelationType) -> Result<RelationType>;

    /// Persist changes
    fn update(&self, relation_type: &RelationType) -> Result<RelationType>;

    /// Look up by id
    fn find_by_id(&self, id: RelationTypeId) -> Result<Option<RelationType>>;

    /// All RelationTypes
    fn list_all(&self) -> Result<Vec<RelationType>>;

    /// Remove a RelationType
    fn delete(&self, id: RelationTypeId) -> Result<()>;
}

/// Storage for Relations
pub trait RelationStore: Send + Sync {
    /// Persist a new Relation
    fn create(&self, relation: &Relation) -> Result<Relation>;

    /// Persist changes
    fn update(&self, relation: &Relation) -> Result<Relation>;

    /// Look up by id
    fn find_by_id(&self, id: RelationId) -> Result<Option<Relation>>;

    /// All Relations
    fn list_all(&self) -> Result<Vec<Relation>>;

    /// Relations of a RelationType, in creation order
    fn list_by_relation_type(&self, relation_type: RelationTypeId) -> Result<Vec<Relation>>;

    /// Relations whose source is this Instance
    fn list_by_source_instance(&self, instance: InstanceId) -> Result<Vec<Relation>>;

    /// Remove a Relation
    fn delete(&self, id: RelationId) -> Result<()>;
}

/// All stores of one backend plus transaction hooks
///
/// The transaction hooks default to no-ops, which matches a backend whose
/// calls are only atomic one at a time. A backend that can group calls
/// overrides all three, and must keep one caller's rollback from undoing
/// another caller's writes: the engine shares one store across threads.
pub trait MetadataStore: Send + Sync {
    /// Entity storage
    fn entities(&self) -> &dyn EntityStore;

    /// Attribute storage
    fn attributes(&self) -> &dyn AttributeStore;

    /// Instance storage
    fn instances(&self) -> &dyn InstanceStore;

    /// AttributeValue storage
    fn attribute_values(&self) -> &dyn AttributeValueStore;

    /// RelationType storage
    fn relation_types(&self) -> &dyn RelationTypeStore;

    /// Relation storage
    fn relations(&self) -> &dyn RelationStore;

    /// Start grouping subsequent calls
    fn begin(&self) -> Result<()> {
        Ok(())
    }

    /// Make the grouped calls visible
    fn commit(&self) -> Result<()> {
        Ok(())
    }

    /// Undo the grouped calls
    fn rollback(&self) -> Result<()> {
        Ok(())
    }
}
