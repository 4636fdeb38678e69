//! Metadata kernel engine
//!
//! This crate orchestrates the lower layers:
//! - Managers: Entity, Attribute, Instance, RelationType and Relation
//!   operations with all their consistency rules
//! - Namespace decoration: the default-namespace token at the store boundary
//! - Cardinality transitions: which Relations a RelationType update prunes
//! - Configuration: `metakernel.toml`
//!
//! The engine is the only component that knows about:
//! - Validation order and error messages
//! - Multi-step writes and the transactions around them
//! - The type registry in use

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cardinality;
pub mod config;
pub mod kernel;
pub mod managers;
pub mod namespace;
pub mod store;

pub use cardinality::PruneStrategy;
pub use config::{KernelConfig, CONFIG_FILE_NAME, DEFAULT_NAMESPACE};
pub use kernel::MetadataKernel;
pub use managers::{
    AttributeManager, EntityManager, InstanceManager, RelationManager, RelationTypeManager,
};
pub use namespace::{Decorate, NamespaceDecorator};
pub use store::DecoratedStore;
