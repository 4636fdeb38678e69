//! Storage layer for the metadata kernel
//!
//! This crate implements the store contracts from `metakernel-core` with:
//! - MemoryStore: BTreeMap-based rows behind a `parking_lot::RwLock`
//! - Id allocation with AtomicU64, shared by every kind
//! - Dense Attribute sequences maintained on insert and move
//! - Optimistic versions checked on update
//! - Savepoint journal for begin/commit/rollback

#![warn(missing_docs)]
#![warn(clippy::all)]

mod journal;
pub mod memory;
mod state;

pub use memory::{MemoryStore, StoreStats};
