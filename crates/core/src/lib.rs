//! Core types and traits for the metadata kernel
//!
//! This crate defines the foundational types used throughout the system:
//! - Ids: typed, store-assigned identifiers (EntityId, AttributeId, ...)
//! - AttributeType / Cardinality: the closed enums of the model
//! - Model: Entity, Attribute, Instance, AttributeValue, RelationType, Relation
//! - Naming: name/namespace patterns and full-name handling
//! - Error: MetadataError and its ErrorKind categories
//! - Traits: the store contracts the kernel consumes (MetadataStore)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod model;
pub mod naming;
pub mod traits;
pub mod types;

pub use error::{ErrorKind, MetadataError, Result};
pub use model::{
    Attribute, AttributeValue, Entity, EntityRef, Instance, InstanceRef, Relation, RelationType,
};
pub use naming::{is_valid_name, is_valid_namespace, join_full_name, trim_dots, FullName};
pub use traits::{
    AttributeStore, AttributeValueStore, EntityStore, InstanceStore, MetadataStore,
    RelationStore, RelationTypeStore,
};
pub use types::{
    AttributeId, AttributeType, AttributeValueId, Cardinality, EntityId, InstanceId,
    RelationId, RelationTypeId,
};
