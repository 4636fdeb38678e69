//! The kernel facade
//!
//! [`MetadataKernel`] ties a store backend, the type registry and the
//! configuration together and hands out the managers. It is cheap to clone;
//! clones share the same context.
//!
//! # Example
//!
//! ```ignore
//! let kernel = MetadataKernel::in_memory();
//! let person = kernel.entities().create(&Entity::new("", "person"))?;
//! kernel
//!     .attributes()
//!     .create(&Attribute::new(person.to_ref(), "name", AttributeType::Text))?;
//! ```

use std::sync::Arc;

use tracing::debug;

use metakernel_core::{MetadataStore, Result};
use metakernel_storage::MemoryStore;
use metakernel_typesys::TypeRegistry;

use crate::config::KernelConfig;
use crate::managers::{
    AttributeManager, EntityManager, InstanceManager, RelationManager, RelationTypeManager,
};
use crate::namespace::NamespaceDecorator;
use crate::store::DecoratedStore;

/// State shared by every manager of one kernel
pub(crate) struct KernelContext {
    pub(crate) store: DecoratedStore,
    pub(crate) types: Arc<TypeRegistry>,
    pub(crate) config: KernelConfig,
}

/// Entry point to the metadata kernel
#[derive(Clone)]
pub struct MetadataKernel {
    ctx: Arc<KernelContext>,
}

impl MetadataKernel {
    /// Kernel over `store` with the default configuration and built-in types
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self::build(store, KernelConfig::default(), Arc::new(TypeRegistry::with_builtins()))
    }

    /// Kernel over `store` with an explicit configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn with_config(store: Arc<dyn MetadataStore>, config: KernelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(
            store,
            config,
            Arc::new(TypeRegistry::with_builtins()),
        ))
    }

    /// Kernel over a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Replace the type registry
    ///
    /// Types are looked up by the name of an Attribute's type, so a registry
    /// may override a built-in definition.
    pub fn with_types(self, types: TypeRegistry) -> Self {
        let ctx = &self.ctx;
        Self::build(
            Arc::clone(ctx.store.raw_arc()),
            ctx.config.clone(),
            Arc::new(types),
        )
    }

    fn build(store: Arc<dyn MetadataStore>, config: KernelConfig, types: Arc<TypeRegistry>) -> Self {
        let decorator = NamespaceDecorator::new(config.default_namespace.clone());
        debug!(
            target: "metakernel::store",
            default_namespace = %config.default_namespace,
            types = types.len(),
            "Built metadata kernel"
        );
        Self {
            ctx: Arc::new(KernelContext {
                store: DecoratedStore::new(store, decorator),
                types,
                config,
            }),
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &KernelConfig {
        &self.ctx.config
    }

    /// Registered attribute types
    pub fn types(&self) -> &TypeRegistry {
        &self.ctx.types
    }

    /// Entity operations
    pub fn entities(&self) -> EntityManager {
        EntityManager::new(Arc::clone(&self.ctx))
    }

    /// Attribute operations
    pub fn attributes(&self) -> AttributeManager {
        AttributeManager::new(Arc::clone(&self.ctx))
    }

    /// Instance operations
    pub fn instances(&self) -> InstanceManager {
        InstanceManager::new(Arc::clone(&self.ctx))
    }

    /// RelationType operations
    pub fn relation_types(&self) -> RelationTypeManager {
        RelationTypeManager::new(Arc::clone(&self.ctx))
    }

    /// Relation operations
    pub fn relations(&self) -> RelationManager {
        RelationManager::new(Arc::clone(&self.ctx))
    }
}

impl std::fmt::Debug for MetadataKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataKernel")
            .field("config", &self.ctx.config)
            .field("types", &self.ctx.types.names())
            .finish()
    }
}
