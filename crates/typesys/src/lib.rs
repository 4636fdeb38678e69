//! Attribute type system for the metadata kernel
//!
//! - **Registry**: maps a type name to its [`AttributeTypeDefinition`]
//! - **Definition**: allowed configuration fields, value kind and the
//!   ordered validator chain of one attribute type
//! - **Validators**: small data values run against a configuration document
//!   (`validate_default`) or against a candidate value (`validate_value`)
//! - **Check**: the pipeline the managers call: parse, reject unknown
//!   fields, run the chain, aggregate the errors
//!
//! ## Error accumulation
//!
//! Every validator in a chain runs even after another one failed; their
//! [`ValidationError`]s are collected and reported together in one
//! `MetadataError`. Unknown configuration fields are the exception: they
//! fail before the chain runs.
//!
//! ## Example
//!
//! ```
//! use metakernel_typesys::{check, TypeRegistry};
//!
//! let registry = TypeRegistry::with_builtins();
//! let text = registry.get("TEXT").unwrap();
//! let config = check::parse_configuration(r#"{"minLength":5,"maxLength":3}"#).unwrap();
//! let err = check::validate_configuration(&text, "title", &config).unwrap_err();
//! assert!(err.to_string().starts_with("Invalid configuration for attribute title: "));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod check;
pub mod definition;
pub mod fields;
pub mod registry;
pub mod rule;
pub mod validator;
pub mod value_kind;

pub use check::{Configuration, FieldNameCheck};
pub use definition::AttributeTypeDefinition;
pub use registry::TypeRegistry;
pub use rule::Rule;
pub use validator::{AttributeValidator, ValidationError};
pub use value_kind::ValueKind;
