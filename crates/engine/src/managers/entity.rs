//! Entity lifecycle
//!
//! Entities are stored lower-case. A full name is split on its last dot;
//! a key without a dot addresses the default namespace.

use std::sync::Arc;

use tracing::{debug, info};

use metakernel_core::{
    is_valid_name, is_valid_namespace, trim_dots, Entity, EntityId, FullName, MetadataError,
    Result,
};

use crate::kernel::KernelContext;

/// Create, look up and update Entities
#[derive(Clone)]
pub struct EntityManager {
    ctx: Arc<KernelContext>,
}

impl EntityManager {
    pub(crate) fn new(ctx: Arc<KernelContext>) -> Self {
        Self { ctx }
    }

    /// Create an Entity
    ///
    /// The name is mandatory. Namespace and name are lower-cased, checked
    /// against their patterns and against existing Entities.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a missing or malformed name or namespace
    /// - `DuplicateEntity` if the normalized full name is taken
    pub fn create(&self, entity: &Entity) -> Result<Entity> {
        let entity = self.validate(entity)?;
        let created = self
            .ctx
            .store
            .write(&entity, |s, e| s.entities().create(e))?;
        info!(target: "metakernel::entity", full_name = %created.full_name(), "Created entity");
        Ok(created)
    }

    /// Update namespace and name of a stored Entity
    ///
    /// Both `id` and `version` are required; then the same checks as
    /// [`create`](Self::create) run, ignoring the Entity itself in the
    /// duplicate check.
    pub fn update(&self, entity: &Entity) -> Result<Entity> {
        match (entity.id, entity.version) {
            (None, None) => {
                return Err(MetadataError::invalid_argument(
                    "The version and id of an Entity are mandatory on update",
                ))
            }
            (None, Some(_)) => {
                return Err(MetadataError::invalid_argument(
                    "The id of an Entity is mandatory on update",
                ))
            }
            (Some(_), None) => {
                return Err(MetadataError::invalid_argument(
                    "The version of an Entity is mandatory on update",
                ))
            }
            (Some(_), Some(_)) => {}
        }

        let entity = self.validate(entity)?;
        let updated = self
            .ctx
            .store
            .write(&entity, |s, e| s.entities().update(e))?;
        info!(
            target: "metakernel::entity",
            full_name = %updated.full_name(),
            version = ?updated.version,
            "Updated entity"
        );
        Ok(updated)
    }

    /// Look up an Entity by `namespace.name`, or by `name` alone in the
    /// default namespace
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty or malformed key
    /// - `EntityNotFound` when nothing matches
    pub fn find_by_full_name(&self, full_name: &str) -> Result<Entity> {
        if full_name.is_empty() {
            return Err(MetadataError::invalid_argument(
                "The full name of an Entity is mandatory",
            ));
        }
        let key = full_name.to_lowercase();
        let parsed = FullName::parse(&key);
        let namespace_ok = if parsed.qualified {
            is_valid_namespace(parsed.namespace)
        } else {
            true
        };
        let name_ok = parsed.name.is_empty() || is_valid_name(parsed.name);
        if !namespace_ok || !name_ok {
            return Err(MetadataError::invalid_argument(format!(
                "Invalid key for Entity: {}",
                trim_dots(full_name)
            )));
        }

        let store_key = self.ctx.store.qualify_full_name(&key);
        debug!(target: "metakernel::entity", key = %store_key, "Looking up entity");
        self.ctx
            .store
            .read(|s| s.entities().find_by_full_name(&store_key))?
            .ok_or_else(|| MetadataError::EntityNotFound {
                key: trim_dots(full_name).to_string(),
            })
    }

    /// Look up an Entity by id
    pub fn find_by_id(&self, id: EntityId) -> Result<Option<Entity>> {
        self.ctx.store.read(|s| s.entities().find_by_id(id))
    }

    /// All Entities
    pub fn list_all(&self) -> Result<Vec<Entity>> {
        self.ctx.store.read(|s| s.entities().list_all())
    }

    /// Entities whose full name contains `fragment`; empty means all
    ///
    /// The fragment is matched against the full name as callers see it, so
    /// Entities of the default namespace match on their bare name only.
    pub fn list_by_full_name(&self, fragment: &str) -> Result<Vec<Entity>> {
        if !fragment.is_empty() && !is_valid_namespace(fragment) {
            return Err(MetadataError::invalid_argument(format!(
                "Invalid value for Entity full name: {}",
                fragment
            )));
        }
        let fragment = fragment.to_lowercase();
        let entities = self.ctx.store.read(|s| s.entities().list_by_full_name(""))?;
        Ok(entities
            .into_iter()
            .filter(|entity| entity.full_name().contains(&fragment))
            .collect())
    }

    /// Remove an Entity
    pub fn delete(&self, id: EntityId) -> Result<()> {
        self.ctx.store.raw().entities().delete(id)?;
        info!(target: "metakernel::entity", entity_id = %id, "Deleted entity");
        Ok(())
    }

    /// Normalized copy of `entity`, checked for patterns and duplicates
    fn validate(&self, entity: &Entity) -> Result<Entity> {
        if entity.name.is_empty() {
            return Err(MetadataError::invalid_argument(
                "The name of an Entity is mandatory",
            ));
        }
        let mut entity = entity.clone();
        entity.name = entity.name.to_lowercase();
        entity.namespace = entity.namespace.to_lowercase();

        if !entity.namespace.is_empty() && !is_valid_namespace(&entity.namespace) {
            return Err(MetadataError::invalid_argument(format!(
                "Invalid value for Entity namespace: {}",
                entity.namespace
            )));
        }
        if !is_valid_name(&entity.name) {
            return Err(MetadataError::invalid_argument(format!(
                "Invalid value for Entity name: {}",
                entity.name
            )));
        }

        match self.find_by_full_name(&entity.full_name()) {
            Ok(found) if found.id != entity.id => Err(MetadataError::DuplicateEntity {
                full_name: found.full_name(),
            }),
            Ok(_) => Ok(entity),
            Err(e) if e.is_not_found() => Ok(entity),
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager").finish_non_exhaustive()
    }
}
