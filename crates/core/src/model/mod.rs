//! Model types of the metadata graph
//!
//! - [`Entity`] declares a class; it owns an ordered list of [`Attribute`]s
//! - [`Instance`] holds [`AttributeValue`]s for one Entity
//! - [`RelationType`] declares an allowed edge between two Entities
//! - [`Relation`] is a concrete edge between two Instances
//!
//! Back-references (`Attribute → Entity`, `AttributeValue → Instance`,
//! `Relation → Instance`) are lightweight [`EntityRef`] / [`InstanceRef`]
//! values rather than owned copies, so the graph has no cycles.

mod attribute;
mod entity;
mod instance;
mod relation;

pub use attribute::Attribute;
pub use entity::{Entity, EntityRef};
pub use instance::{AttributeValue, Instance, InstanceRef};
pub use relation::{Relation, RelationType};
