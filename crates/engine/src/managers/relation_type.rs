//! RelationType lifecycle and cardinality pruning
//!
//! An update that tightens the cardinality deletes the Relations the new
//! rule no longer allows, as decided by [`crate::cardinality`]. The pruning
//! and the update run in one transaction.

use std::sync::Arc;

use tracing::{debug, info, warn};

use metakernel_core::{Cardinality, EntityRef, MetadataError, RelationType, RelationTypeId, Result};

use crate::cardinality::{self, PruneStrategy};
use crate::kernel::KernelContext;
use crate::managers::EntityManager;

/// Create, look up, update and delete RelationTypes
#[derive(Clone)]
pub struct RelationTypeManager {
    ctx: Arc<KernelContext>,
}

impl RelationTypeManager {
    pub(crate) fn new(ctx: Arc<KernelContext>) -> Self {
        Self { ctx }
    }

    /// Create a RelationType
    ///
    /// Unset cardinalities default to ONE. `reverse_name` is required when
    /// the type is bidirectional and dropped when it is not.
    pub fn create(&self, relation_type: &RelationType) -> Result<RelationType> {
        let mut relation_type = relation_type.clone();
        let one = Some(Cardinality::One);
        relation_type.source_cardinality = relation_type.source_cardinality.or(one);
        relation_type.target_cardinality = relation_type.target_cardinality.or(one);
        if relation_type.source_entity.is_none() {
            return Err(MetadataError::invalid_argument(
                "Invalid value for source entity: The source entity is mandatory",
            ));
        }
        if relation_type.target_entity.is_none() {
            return Err(MetadataError::invalid_argument(
                "Invalid value for target entity: The target entity is mandatory",
            ));
        }
        self.check_entities(&relation_type)?;
        check_reverse_name(&mut relation_type)?;

        let created = self
            .ctx
            .store
            .write(&relation_type, |s, rt| s.relation_types().create(rt))?;
        info!(
            target: "metakernel::relation_type",
            relation_type_id = ?created.id,
            name = %created.name,
            "Created relation type"
        );
        Ok(created)
    }

    /// Update a RelationType, pruning Relations a tighter cardinality forbids
    ///
    /// Unset cardinalities and Entity references keep their stored values.
    ///
    /// Pruning keeps the first Relations in creation order and deletes the
    /// rest for good; loosening the cardinality again does not bring them
    /// back.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` without an id, when an Entity does not resolve,
    ///   or when a bidirectional type has no reverse name
    /// - `RelationTypeNotFound` if nothing is stored under the id
    pub fn update(&self, relation_type: &RelationType) -> Result<RelationType> {
        let id = relation_type.id.ok_or_else(|| {
            MetadataError::invalid_argument("The id of a RelationType is mandatory on update")
        })?;
        let stored = self
            .find_by_id(id)?
            .ok_or(MetadataError::RelationTypeNotFound { id: id.as_u64() })?;

        let mut relation_type = relation_type.clone();
        if relation_type.source_entity.is_none() {
            relation_type.source_entity = stored.source_entity.clone();
        }
        if relation_type.target_entity.is_none() {
            relation_type.target_entity = stored.target_entity.clone();
        }
        self.check_entities(&relation_type)?;
        check_reverse_name(&mut relation_type)?;

        let old_source = stored.source_cardinality.unwrap_or(Cardinality::One);
        let old_target = stored.target_cardinality.unwrap_or(Cardinality::One);
        let new_source = *relation_type.source_cardinality.get_or_insert(old_source);
        let new_target = *relation_type.target_cardinality.get_or_insert(old_target);
        let strategy = cardinality::transition(old_source, new_source, old_target, new_target);

        let updated = self.ctx.store.transaction(|| {
            if strategy != PruneStrategy::None {
                self.prune(id, strategy)?;
            }
            self.ctx
                .store
                .write(&relation_type, |s, rt| s.relation_types().update(rt))
        })?;
        info!(
            target: "metakernel::relation_type",
            relation_type_id = %id,
            source_cardinality = %new_source,
            target_cardinality = %new_target,
            "Updated relation type"
        );
        Ok(updated)
    }

    /// Look up a RelationType by id
    pub fn find_by_id(&self, id: RelationTypeId) -> Result<Option<RelationType>> {
        debug!(target: "metakernel::relation_type", relation_type_id = %id, "Looking up relation type");
        self.ctx.store.read(|s| s.relation_types().find_by_id(id))
    }

    /// All RelationTypes
    pub fn list_all(&self) -> Result<Vec<RelationType>> {
        self.ctx.store.read(|s| s.relation_types().list_all())
    }

    /// Remove a RelationType and its Relations
    pub fn delete(&self, id: RelationTypeId) -> Result<()> {
        self.ctx.store.raw().relation_types().delete(id)?;
        info!(target: "metakernel::relation_type", relation_type_id = %id, "Deleted relation type");
        Ok(())
    }

    fn prune(&self, id: RelationTypeId, strategy: PruneStrategy) -> Result<()> {
        let relations = self.ctx.store.raw().relations();
        let doomed = cardinality::prune(strategy, &relations.list_by_relation_type(id)?);
        for relation in &doomed {
            relations.delete(*relation)?;
        }
        if !doomed.is_empty() {
            warn!(
                target: "metakernel::relation_type",
                relation_type_id = %id,
                strategy = ?strategy,
                pruned = doomed.len(),
                "Pruned relations after cardinality change"
            );
        }
        Ok(())
    }

    fn check_entities(&self, relation_type: &RelationType) -> Result<()> {
        let entities = EntityManager::new(Arc::clone(&self.ctx));
        let resolves = |entity: Option<&EntityRef>| -> Result<bool> {
            match entity.and_then(|e| e.id) {
                Some(id) => Ok(entities.find_by_id(id)?.is_some()),
                None => Ok(false),
            }
        };
        if !resolves(relation_type.source_entity.as_ref())? {
            return Err(MetadataError::invalid_argument(
                "Invalid argument: The source entity is mandatory!",
            ));
        }
        if !resolves(relation_type.target_entity.as_ref())? {
            return Err(MetadataError::invalid_argument(
                "Invalid argument: The target entity is mandatory!",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for RelationTypeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationTypeManager").finish_non_exhaustive()
    }
}

fn check_reverse_name(relation_type: &mut RelationType) -> Result<()> {
    if !relation_type.bidirectional {
        relation_type.reverse_name = None;
        return Ok(());
    }
    if relation_type.reverse_name.is_none() {
        return Err(MetadataError::invalid_argument(
            "Invalid argument: Reverse Name is mandatory when the relationship is bidirectional!",
        ));
    }
    Ok(())
}
