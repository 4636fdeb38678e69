//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::sync::{Arc, Once};

pub use metakernel::{
    Attribute, AttributeType, Cardinality, Entity, ErrorKind, Instance, KernelConfig,
    MemoryStore, MetadataError, MetadataKernel, Relation, RelationType,
};
use serde_json::Value as JsonValue;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route kernel logs through the test harness once per binary.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
            .try_init();
    });
}

/// A fresh in-memory kernel plus a handle on its store.
pub fn kernel() -> (MetadataKernel, Arc<MemoryStore>) {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    (MetadataKernel::new(store.clone()), store)
}

// ============================================================================
// Builders
// ============================================================================

/// Declare an Entity.
pub fn entity(kernel: &MetadataKernel, namespace: &str, name: &str) -> Entity {
    kernel
        .entities()
        .create(&Entity::new(namespace, name))
        .unwrap_or_else(|e| panic!("create entity {}.{}: {}", namespace, name, e))
}

/// Declare an Attribute, optionally with a configuration document.
pub fn attribute(
    kernel: &MetadataKernel,
    owner: &Entity,
    name: &str,
    attribute_type: AttributeType,
    configuration: Option<&str>,
) -> Attribute {
    let mut attr = Attribute::new(owner.to_ref(), name, attribute_type);
    if let Some(raw) = configuration {
        attr = attr.with_configuration(raw);
    }
    kernel
        .attributes()
        .create(&attr)
        .unwrap_or_else(|e| panic!("create attribute {}: {}", name, e))
}

/// Create an Instance from `(attribute, value)` pairs.
pub fn instance(
    kernel: &MetadataKernel,
    owner: &Entity,
    values: &[(&Attribute, JsonValue)],
) -> Instance {
    let instance = values
        .iter()
        .fold(Instance::new(owner.to_ref()), |acc, (attr, value)| {
            acc.with_value(attr, Some(value.clone()))
        });
    kernel
        .instances()
        .create(&instance)
        .unwrap_or_else(|e| panic!("create instance of {}: {}", owner.full_name(), e))
}
