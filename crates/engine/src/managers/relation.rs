//! Relations between Instances

use std::sync::Arc;

use tracing::{debug, info};

use metakernel_core::{InstanceId, MetadataError, Relation, RelationId, RelationTypeId, Result};

use crate::kernel::KernelContext;

/// Create, look up, update and delete Relations
#[derive(Clone)]
pub struct RelationManager {
    ctx: Arc<KernelContext>,
}

impl RelationManager {
    pub(crate) fn new(ctx: Arc<KernelContext>) -> Self {
        Self { ctx }
    }

    /// Create a Relation between two stored Instances
    ///
    /// # Errors
    ///
    /// `MissingSourceInstance` / `MissingTargetInstance` when an end has no
    /// id or its id does not resolve.
    pub fn create(&self, relation: &Relation) -> Result<Relation> {
        self.check_instances(relation)?;
        let created = self
            .ctx
            .store
            .write(relation, |s, r| s.relations().create(r))?;
        info!(
            target: "metakernel::relation",
            relation_id = ?created.id,
            relation_type_id = ?created.relation_type,
            "Created relation"
        );
        Ok(created)
    }

    /// Update a stored Relation, re-checking both ends
    pub fn update(&self, relation: &Relation) -> Result<Relation> {
        if relation.id.is_none() {
            return Err(MetadataError::invalid_argument(
                "The id of a Relation is mandatory on update",
            ));
        }
        self.check_instances(relation)?;
        let updated = self
            .ctx
            .store
            .write(relation, |s, r| s.relations().update(r))?;
        info!(target: "metakernel::relation", relation_id = ?updated.id, "Updated relation");
        Ok(updated)
    }

    /// Look up a Relation by id
    pub fn find_by_id(&self, id: RelationId) -> Result<Option<Relation>> {
        self.ctx.store.read(|s| s.relations().find_by_id(id))
    }

    /// All Relations
    pub fn list_all(&self) -> Result<Vec<Relation>> {
        self.ctx.store.read(|s| s.relations().list_all())
    }

    /// Relations of a RelationType, in creation order
    pub fn list_by_relation_type(&self, relation_type: RelationTypeId) -> Result<Vec<Relation>> {
        self.ctx
            .store
            .read(|s| s.relations().list_by_relation_type(relation_type))
    }

    /// Relations whose source is `instance`
    pub fn list_by_source_instance(&self, instance: InstanceId) -> Result<Vec<Relation>> {
        self.ctx
            .store
            .read(|s| s.relations().list_by_source_instance(instance))
    }

    /// Remove a Relation
    pub fn delete(&self, id: RelationId) -> Result<()> {
        self.ctx.store.raw().relations().delete(id)?;
        debug!(target: "metakernel::relation", relation_id = %id, "Deleted relation");
        Ok(())
    }

    fn check_instances(&self, relation: &Relation) -> Result<()> {
        let source = relation.source.as_ref().and_then(|s| s.id);
        let target = relation.target.as_ref().and_then(|t| t.id);
        let (Some(source), Some(target)) = (source, target) else {
            return Err(if source.is_none() {
                MetadataError::MissingSourceInstance
            } else {
                MetadataError::MissingTargetInstance
            });
        };
        let instances = self.ctx.store.raw().instances();
        if instances.find_by_id(source)?.is_none() {
            return Err(MetadataError::MissingSourceInstance);
        }
        if instances.find_by_id(target)?.is_none() {
            return Err(MetadataError::MissingTargetInstance);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RelationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationManager").finish_non_exhaustive()
    }
}
