//! Integration Tests
//!
//! Cross-crate tests through the `metakernel` facade:
//! - Catalog: a full model declared, populated and reshaped
//! - Config: kernels built from `metakernel.toml`
//! - Concurrency: one kernel shared across threads

#[path = "../common/mod.rs"]
mod common;

mod catalog;
mod concurrency;
mod config_file;
