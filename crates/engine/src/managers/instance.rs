//! Instance creation and lookup
//!
//! Creation validates everything before the first write: the Entity, the
//! Attribute of every value, defaults, then every value against its
//! Attribute's type and configuration. The shell and its values are then
//! written in one transaction.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, info};

use metakernel_core::{
    Attribute, AttributeValue, Entity, EntityId, Instance, InstanceId, MetadataError, Result,
};
use metakernel_typesys::{check, ValidationError};

use crate::kernel::KernelContext;
use crate::managers::EntityManager;

const VALUE_PREFIX: &str = "Invalid value for the Instance. ";

/// Create and look up Instances
#[derive(Clone)]
pub struct InstanceManager {
    ctx: Arc<KernelContext>,
}

impl InstanceManager {
    pub(crate) fn new(ctx: Arc<KernelContext>) -> Self {
        Self { ctx }
    }

    /// Create an Instance with its values
    ///
    /// A value is matched to an Attribute of the Entity by id, or by name
    /// when it carries no id. An unset value takes the configured `default`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` without an Entity
    /// - `UnknownEntity` if the Entity does not resolve
    /// - `UnknownAttribute` for a value of a foreign Attribute
    /// - `InvalidValue` listing every failed value check
    ///
    /// Nothing is written when any check fails.
    pub fn create(&self, instance: &Instance) -> Result<Instance> {
        let entity_ref = instance.entity.as_ref().ok_or_else(|| {
            MetadataError::invalid_argument(
                "Invalid value for Instance entity: The entity is mandatory",
            )
        })?;
        let entity_id = entity_ref.id.ok_or_else(|| {
            MetadataError::invalid_argument(
                "Invalid value for Instance entity: The entity is mandatory",
            )
        })?;
        let entity = EntityManager::new(Arc::clone(&self.ctx))
            .find_by_id(entity_id)?
            .ok_or_else(|| {
                MetadataError::unknown_entity(format!("Unknown entity id: {}", entity_id))
            })?;

        let values = instance
            .values
            .iter()
            .map(|value| bind(&entity, value))
            .collect::<Result<Vec<_>>>()?;

        let mut errors = Vec::new();
        for value in &values {
            errors.extend(self.check_value(value)?);
        }
        if let Some(message) = check::aggregate(&errors, VALUE_PREFIX) {
            return Err(MetadataError::InvalidValue { message });
        }

        let shell = Instance {
            id: None,
            version: None,
            entity: Some(entity.to_ref()),
            values: Vec::new(),
        };
        let created = self.ctx.store.transaction(|| {
            let created = self
                .ctx
                .store
                .write(&shell, |s, i| s.instances().create(i))?;
            for mut value in values {
                value.instance = Some(created.to_ref());
                self.ctx
                    .store
                    .write(&value, |s, v| s.attribute_values().create(v))?;
            }
            let id = created
                .id
                .ok_or_else(|| MetadataError::storage("Stored instance has no id"))?;
            self.find_by_id(id)?
                .ok_or_else(|| MetadataError::storage(format!("Instance {} vanished", id)))
        })?;
        info!(
            target: "metakernel::instance",
            entity = %entity.full_name(),
            instance_id = ?created.id,
            values = created.values.len(),
            "Created instance"
        );
        Ok(created)
    }

    /// Look up an Instance with its values
    pub fn find_by_id(&self, id: InstanceId) -> Result<Option<Instance>> {
        debug!(target: "metakernel::instance", instance_id = %id, "Looking up instance");
        self.ctx.store.read(|s| s.instances().find_by_id(id))
    }

    /// All Instances of an Entity
    pub fn list_by_entity_id(&self, entity_id: EntityId) -> Result<Vec<Instance>> {
        self.ctx
            .store
            .read(|s| s.instances().list_by_entity_id(entity_id))
    }

    /// Remove an Instance with its values and Relations
    pub fn delete(&self, id: InstanceId) -> Result<()> {
        self.ctx.store.raw().instances().delete(id)?;
        info!(target: "metakernel::instance", instance_id = %id, "Deleted instance");
        Ok(())
    }

    fn check_value(&self, value: &AttributeValue) -> Result<Vec<ValidationError>> {
        let Some(attribute_type) = &value.attribute.attribute_type else {
            return Ok(Vec::new());
        };
        let definition = self.ctx.types.get_for(attribute_type)?;
        let config = configuration(&value.attribute)?;
        Ok(check::validate_value(
            &definition,
            config.as_ref(),
            value.value.as_ref(),
        ))
    }
}

impl std::fmt::Debug for InstanceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceManager").finish_non_exhaustive()
    }
}

/// Attach the stored Attribute to a value and fill in its default
fn bind(entity: &Entity, value: &AttributeValue) -> Result<AttributeValue> {
    let requested = &value.attribute;
    let attribute = match requested.id {
        Some(id) => entity.attributes.iter().find(|a| a.id == Some(id)),
        None => entity.attribute(&requested.name),
    }
    .ok_or_else(|| MetadataError::UnknownAttribute {
        entity: entity.full_name(),
        attribute: requested.name.clone(),
    })?;

    let mut bound = value.clone();
    bound.id = None;
    bound.version = None;
    bound.attribute = attribute.clone();
    if bound.value.as_ref().map_or(true, JsonValue::is_null) {
        if let Some(config) = configuration(attribute)? {
            if let Some(default) = check::default_value(&config) {
                bound.value = Some(default.clone());
            }
        }
    }
    Ok(bound)
}

fn configuration(attribute: &Attribute) -> Result<Option<check::Configuration>> {
    attribute
        .configuration()
        .map(check::parse_configuration)
        .transpose()
}
