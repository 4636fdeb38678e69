//! One facade per area of the metadata graph
//!
//! Managers are stateless: each holds an `Arc` of the kernel context and can
//! be created as often as needed. All validation happens here; the store
//! only persists.

mod attribute;
mod entity;
mod instance;
mod relation;
mod relation_type;

pub use attribute::AttributeManager;
pub use entity::EntityManager;
pub use instance::InstanceManager;
pub use relation::RelationManager;
pub use relation_type::RelationTypeManager;
