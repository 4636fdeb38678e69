//! Metakernel - a metadata kernel for runtime-declared data models
//!
//! Entities (classes) are declared at runtime. Each carries typed, ordered
//! Attributes; Instances hold one value per Attribute; RelationTypes declare
//! edges between Entities and Relations connect Instances.
//!
//! # Quick Start
//!
//! ```
//! use metakernel::{Attribute, AttributeType, Entity, Instance, MetadataKernel};
//! use serde_json::json;
//!
//! let kernel = MetadataKernel::in_memory();
//! let person = kernel.entities().create(&Entity::new("", "person")).unwrap();
//! let name = kernel
//!     .attributes()
//!     .create(
//!         &Attribute::new(person.to_ref(), "name", AttributeType::Text)
//!             .with_configuration(r#"{"maxLength":20}"#),
//!     )
//!     .unwrap();
//!
//! let ada = kernel
//!     .instances()
//!     .create(&Instance::new(person.to_ref()).with_value(&name, Some(json!("Ada"))))
//!     .unwrap();
//! assert_eq!(ada.value_of("name"), Some(&json!("Ada")));
//! ```
//!
//! # Architecture
//!
//! - `metakernel-core`: model types, naming rules, errors, store contracts
//! - `metakernel-typesys`: attribute type registry and validator chains
//! - `metakernel-storage`: in-memory store backend
//! - `metakernel-engine`: managers, namespace decoration, the kernel facade

pub use metakernel_core::*;
pub use metakernel_engine::{
    AttributeManager, EntityManager, InstanceManager, KernelConfig, MetadataKernel,
    PruneStrategy, RelationManager, RelationTypeManager, CONFIG_FILE_NAME, DEFAULT_NAMESPACE,
};
pub use metakernel_storage::{MemoryStore, StoreStats};
pub use metakernel_typesys::{
    AttributeTypeDefinition, AttributeValidator, FieldNameCheck, Rule, TypeRegistry,
    ValidationError, ValueKind,
};
