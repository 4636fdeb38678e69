//! Attribute lifecycle
//!
//! Create checks, in order: parent Entity, duplicate name, sequence, name,
//! type, configuration. Update checks: name, sequence, type, duplicate
//! name, configuration.
//!
//! Sequences are 1-based. On create the bound is `[1, count + 1]`; on
//! update it is `[1, max]`, so an update can never move an Attribute past
//! the current last position.

use std::sync::Arc;

use tracing::{debug, info};

use metakernel_core::{is_valid_name, Attribute, AttributeId, Entity, MetadataError, Result};
use metakernel_typesys::check;

use crate::kernel::KernelContext;
use crate::managers::EntityManager;

/// Create, look up and update Attributes
#[derive(Clone)]
pub struct AttributeManager {
    ctx: Arc<KernelContext>,
}

impl AttributeManager {
    pub(crate) fn new(ctx: Arc<KernelContext>) -> Self {
        Self { ctx }
    }

    fn entities(&self) -> EntityManager {
        EntityManager::new(Arc::clone(&self.ctx))
    }

    /// Create an Attribute on the Entity its `entity` reference points at
    ///
    /// An unset sequence appends. The owning Entity's version is bumped.
    ///
    /// # Errors
    ///
    /// - `UnknownEntity` if the Entity does not resolve by id
    /// - `DuplicateAttribute` if the Entity has an Attribute of that name
    /// - `InvalidArgument` for a bad sequence, name or missing type
    /// - `InvalidConfiguration` for a configuration the type rejects
    pub fn create(&self, attribute: &Attribute) -> Result<Attribute> {
        let entity = self.owning_entity(attribute)?;
        let mut attribute = attribute.clone();
        attribute.entity = entity.to_ref();

        if entity.attribute(&attribute.name).is_some() {
            return Err(duplicate(&entity, &attribute.name));
        }

        let count = entity.attributes.len() as u32;
        match attribute.sequence {
            None => attribute.sequence = Some(count + 1),
            Some(sequence) if !(1..=count + 1).contains(&sequence) => {
                return Err(invalid_sequence(sequence))
            }
            Some(_) => {}
        }

        validate_name(&attribute.name)?;
        self.validate_type_and_configuration(&attribute)?;

        let created = self.ctx.store.transaction(|| {
            let created = self
                .ctx
                .store
                .write(&attribute, |s, a| s.attributes().create(a))?;
            self.touch(&entity)?;
            Ok(created)
        })?;
        info!(
            target: "metakernel::attribute",
            entity = %entity.full_name(),
            attribute = %created.name,
            sequence = ?created.sequence,
            "Created attribute"
        );
        Ok(created)
    }

    /// Update a stored Attribute
    ///
    /// `id` and `sequence` are required. The type cannot change.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a bad name, a missing id or a sequence
    ///   outside `[1, max]`
    /// - `AttributeNotFound` if nothing is stored under the id
    /// - `ImmutableType` if the type differs from the stored one
    /// - `DuplicateAttribute` if another Attribute of the Entity has the name
    /// - `InvalidConfiguration` for a configuration the type rejects
    pub fn update(&self, attribute: &Attribute) -> Result<Attribute> {
        validate_name(&attribute.name)?;
        let id = attribute.id.ok_or_else(|| {
            MetadataError::invalid_argument("The id of an Attribute is mandatory on update")
        })?;
        let stored = self
            .find_by_id(id)?
            .ok_or(MetadataError::AttributeNotFound { id: id.as_u64() })?;
        let entity = self.owning_entity(&stored)?;

        let max = entity.max_sequence().unwrap_or(0);
        match attribute.sequence {
            Some(sequence) if (1..=max).contains(&sequence) => {}
            Some(sequence) => return Err(invalid_sequence(sequence)),
            None => {
                return Err(MetadataError::invalid_argument(
                    "The sequence of an Attribute is mandatory on update",
                ))
            }
        }

        if attribute.attribute_type.is_none() || attribute.attribute_type != stored.attribute_type {
            return Err(MetadataError::ImmutableType {
                attribute: stored.name,
            });
        }

        if let Some(found) =
            self.find_by_name_and_entity_full_name(&attribute.name, &entity.full_name())?
        {
            if found.id != Some(id) {
                return Err(duplicate(&entity, &attribute.name));
            }
        }

        self.validate_type_and_configuration(attribute)?;

        let mut attribute = attribute.clone();
        attribute.entity = entity.to_ref();
        let updated = self.ctx.store.transaction(|| {
            let updated = self
                .ctx
                .store
                .write(&attribute, |s, a| s.attributes().update(a))?;
            self.touch(&entity)?;
            Ok(updated)
        })?;
        info!(
            target: "metakernel::attribute",
            entity = %entity.full_name(),
            attribute = %updated.name,
            sequence = ?updated.sequence,
            "Updated attribute"
        );
        Ok(updated)
    }

    /// Look up an Attribute by id
    pub fn find_by_id(&self, id: AttributeId) -> Result<Option<Attribute>> {
        self.ctx.store.read(|s| s.attributes().find_by_id(id))
    }

    /// Look up an Attribute by name (ignoring case) within an Entity
    ///
    /// Returns `None` when either argument is empty.
    pub fn find_by_name_and_entity_full_name(
        &self,
        name: &str,
        entity_full_name: &str,
    ) -> Result<Option<Attribute>> {
        if name.is_empty() || entity_full_name.is_empty() {
            return Ok(None);
        }
        let full_name = self
            .ctx
            .store
            .qualify_full_name(&entity_full_name.to_lowercase());
        debug!(target: "metakernel::attribute", name, entity = %full_name, "Looking up attribute");
        self.ctx
            .store
            .read(|s| s.attributes().find_by_name_and_entity_full_name(name, &full_name))
    }

    /// Attributes of an Entity in sequence order
    ///
    /// # Errors
    ///
    /// Fails like [`EntityManager::find_by_full_name`].
    pub fn list_all(&self, entity_full_name: &str) -> Result<Vec<Attribute>> {
        Ok(self.entities().find_by_full_name(entity_full_name)?.attributes)
    }

    fn owning_entity(&self, attribute: &Attribute) -> Result<Entity> {
        let found = match attribute.entity.id {
            Some(id) => self.entities().find_by_id(id)?,
            None => None,
        };
        found.ok_or_else(|| {
            MetadataError::unknown_entity(format!(
                "Invalid Entity: {}",
                attribute.entity.full_name()
            ))
        })
    }

    fn validate_type_and_configuration(&self, attribute: &Attribute) -> Result<()> {
        let attribute_type = attribute.attribute_type.as_ref().ok_or_else(|| {
            MetadataError::invalid_argument("The type of an Attribute is mandatory")
        })?;
        let definition = self.ctx.types.get_for(attribute_type)?;
        let Some(raw) = attribute.configuration() else {
            return Ok(());
        };
        let config = check::parse_configuration(raw)?;
        check::check_field_names(
            &definition,
            &attribute.name,
            &config,
            self.ctx.config.field_names,
        )?;
        check::validate_configuration(&definition, &attribute.name, &config)
    }

    /// Bump the Entity's version after one of its Attributes changed
    fn touch(&self, entity: &Entity) -> Result<()> {
        let Some(id) = entity.id else {
            return Ok(());
        };
        if let Some(current) = self.entities().find_by_id(id)? {
            self.ctx
                .store
                .write(&current, |s, e| s.entities().update(e))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for AttributeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeManager").finish_non_exhaustive()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MetadataError::invalid_argument(
            "The name of an Attribute is mandatory",
        ));
    }
    if !is_valid_name(name) {
        return Err(MetadataError::invalid_argument(format!(
            "Invalid value for Attribute name: {}",
            name
        )));
    }
    Ok(())
}

fn invalid_sequence(sequence: u32) -> MetadataError {
    MetadataError::invalid_argument(format!("Invalid value for Attribute sequence: {}", sequence))
}

fn duplicate(entity: &Entity, name: &str) -> MetadataError {
    MetadataError::DuplicateAttribute {
        entity: entity.full_name(),
        attribute: name.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use crate::MetadataKernel;
    use metakernel_core::{
        Attribute, AttributeId, AttributeType, Entity, EntityId, EntityRef, ErrorKind,
        MetadataError,
    };

    fn setup() -> (MetadataKernel, Entity) {
        let kernel = MetadataKernel::in_memory();
        let entity = kernel.entities().create(&Entity::new("a", "foo")).unwrap();
        (kernel, entity)
    }

    fn text(entity: &Entity, name: &str) -> Attribute {
        Attribute::new(entity.to_ref(), name, AttributeType::Text)
    }

    #[test]
    fn test_create_appends_sequence() {
        let (kernel, entity) = setup();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            let created = kernel.attributes().create(&text(&entity, name)).unwrap();
            assert_eq!(created.sequence, Some(i as u32 + 1));
        }
        let err = kernel
            .attributes()
            .create(&text(&entity, "d").with_sequence(6))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for Attribute sequence: 6");
        let err = kernel
            .attributes()
            .create(&text(&entity, "d").with_sequence(0))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for Attribute sequence: 0");
    }

    #[test]
    fn test_create_unknown_entity() {
        let (kernel, _) = setup();
        let orphan = Attribute::new(
            EntityRef {
                id: Some(EntityId::new(999)),
                namespace: "a".into(),
                name: "ghost".into(),
            },
            "x",
            AttributeType::Text,
        );
        let err = kernel.attributes().create(&orphan).unwrap_err();
        assert_eq!(err.to_string(), "Invalid Entity: a.ghost");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_create_duplicate_ignores_case() {
        let (kernel, entity) = setup();
        kernel.attributes().create(&text(&entity, "Name")).unwrap();
        let err = kernel.attributes().create(&text(&entity, "NAME")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Attribute duplication on a.foo Entity. It already has an attribute name."
        );
    }

    #[test]
    fn test_create_name_and_type_checks() {
        let (kernel, entity) = setup();
        let err = kernel.attributes().create(&text(&entity, "")).unwrap_err();
        assert_eq!(err.to_string(), "The name of an Attribute is mandatory");

        let err = kernel.attributes().create(&text(&entity, "a b")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for Attribute name: a b");

        let mut untyped = text(&entity, "x");
        untyped.attribute_type = None;
        let err = kernel.attributes().create(&untyped).unwrap_err();
        assert_eq!(err.to_string(), "The type of an Attribute is mandatory");
    }

    #[test]
    fn test_create_configuration_checks() {
        let (kernel, entity) = setup();
        let err = kernel
            .attributes()
            .create(&text(&entity, "x").with_configuration("{not json"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for Attribute configuration: {not json"
        );
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = kernel
            .attributes()
            .create(&text(&entity, "x").with_configuration(r#"{"minValue":1}"#))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration for attribute x: the minValue configuration attribute is unknown"
        );

        let created = kernel
            .attributes()
            .create(&text(&entity, "x").with_configuration(r#"{"maxLength":10}"#))
            .unwrap();
        assert_eq!(created.configuration.as_deref(), Some(r#"{"maxLength":10}"#));
    }

    #[test]
    fn test_create_bumps_entity_version() {
        let (kernel, entity) = setup();
        kernel.attributes().create(&text(&entity, "x")).unwrap();
        let entity = kernel.entities().find_by_id(entity.id.unwrap()).unwrap().unwrap();
        assert_eq!(entity.version, Some(2));
        assert_eq!(entity.attributes.len(), 1);
    }

    #[test]
    fn test_update_type_is_immutable() {
        let (kernel, entity) = setup();
        let mut attr = kernel.attributes().create(&text(&entity, "x")).unwrap();
        attr.attribute_type = Some(AttributeType::Integer);
        let err = kernel.attributes().update(&attr).unwrap_err();
        assert_eq!(err.to_string(), "Can not change the type of an attribute");
        assert_eq!(err.kind(), ErrorKind::ImmutableField);

        attr.attribute_type = None;
        assert_eq!(
            kernel.attributes().update(&attr).unwrap_err().kind(),
            ErrorKind::ImmutableField
        );
    }

    #[test]
    fn test_update_sequence_bound_is_current_max() {
        let (kernel, entity) = setup();
        kernel.attributes().create(&text(&entity, "a")).unwrap();
        let mut b = kernel.attributes().create(&text(&entity, "b")).unwrap();

        // Legal on create, not on update
        b.sequence = Some(3);
        let err = kernel.attributes().update(&b).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for Attribute sequence: 3");

        b.sequence = None;
        assert!(kernel.attributes().update(&b).is_err());

        b.sequence = Some(1);
        let moved = kernel.attributes().update(&b).unwrap();
        assert_eq!(moved.sequence, Some(1));
        let names: Vec<String> = kernel
            .attributes()
            .list_all("a.foo")
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_update_duplicate_excludes_self() {
        let (kernel, entity) = setup();
        kernel.attributes().create(&text(&entity, "a")).unwrap();
        let mut b = kernel.attributes().create(&text(&entity, "b")).unwrap();

        b.name = "B".into();
        assert_eq!(kernel.attributes().update(&b).unwrap().name, "B");

        let mut b = kernel.attributes().find_by_id(b.id.unwrap()).unwrap().unwrap();
        b.name = "A".into();
        let err = kernel.attributes().update(&b).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
    }

    #[test]
    fn test_update_missing_attribute() {
        let (kernel, entity) = setup();
        let mut ghost = text(&entity, "x").with_sequence(1);
        ghost.id = Some(AttributeId::new(404));
        assert_eq!(
            kernel.attributes().update(&ghost).unwrap_err(),
            MetadataError::AttributeNotFound { id: 404 }
        );
    }

    #[test]
    fn test_find_by_name_with_empty_arguments() {
        let (kernel, entity) = setup();
        kernel.attributes().create(&text(&entity, "x")).unwrap();
        assert!(kernel
            .attributes()
            .find_by_name_and_entity_full_name("", "a.foo")
            .unwrap()
            .is_none());
        assert!(kernel
            .attributes()
            .find_by_name_and_entity_full_name("x", "")
            .unwrap()
            .is_none());
        assert!(kernel
            .attributes()
            .find_by_name_and_entity_full_name("X", "A.Foo")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_default_namespace_lookup() {
        let kernel = MetadataKernel::in_memory();
        let entity = kernel.entities().create(&Entity::new("", "bar")).unwrap();
        kernel.attributes().create(&text(&entity, "x")).unwrap();
        let found = kernel
            .attributes()
            .find_by_name_and_entity_full_name("x", "bar")
            .unwrap()
            .unwrap();
        assert_eq!(found.entity.namespace, "");
        assert_eq!(kernel.attributes().list_all("bar").unwrap().len(), 1);
    }
}
