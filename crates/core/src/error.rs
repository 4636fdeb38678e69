//! Error types for the metadata kernel
//!
//! Every failure surfaced by the kernel is a [`MetadataError`]. The variants
//! keep the distinct causes apart (validation, duplicates, lookups, immutable
//! fields, configuration) while `Display` carries the human-readable message
//! that callers show verbatim.
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for kernel operations
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Broad category of a [`MetadataError`]
///
/// | Kind | Variants |
/// |------|----------|
/// | Validation | `InvalidArgument`, `InvalidValue`, `UnknownAttribute`, `MissingSourceInstance`, `MissingTargetInstance` |
/// | Duplicate | `DuplicateEntity`, `DuplicateAttribute` |
/// | NotFound | `EntityNotFound`, `UnknownEntity`, `AttributeNotFound`, `RelationTypeNotFound`, `RelationNotFound` |
/// | ImmutableField | `ImmutableType` |
/// | Configuration | `InvalidConfiguration`, `UnknownType` |
/// | Conflict | `VersionConflict` |
/// | Storage | `Storage` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Name, pattern, mandatory-field or value violations
    Validation,
    /// Name or entity collisions
    Duplicate,
    /// Lookup misses
    NotFound,
    /// Attempt to change a field that is fixed after creation
    ImmutableField,
    /// Malformed, unknown or mistyped configuration
    Configuration,
    /// Optimistic version check failed
    Conflict,
    /// Failure reported by the store collaborator
    Storage,
}

/// Errors produced by the metadata kernel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// A mandatory field is missing or a value violates a naming rule
    #[error("{message}")]
    InvalidArgument {
        /// Message shown to the caller
        message: String,
    },

    /// Another Entity already uses the normalized full name
    #[error("The {full_name} Entity already exists")]
    DuplicateEntity {
        /// Full name of the existing Entity
        full_name: String,
    },

    /// The owning Entity already has an Attribute with this name
    #[error("Attribute duplication on {entity} Entity. It already has an attribute {attribute}.")]
    DuplicateAttribute {
        /// Full name of the owning Entity
        entity: String,
        /// Lower-cased name of the colliding Attribute
        attribute: String,
    },

    /// No Entity matches the full name
    #[error("Entity not found: {key}")]
    EntityNotFound {
        /// Requested key, stripped of stray leading/trailing dots
        key: String,
    },

    /// A referenced Entity could not be resolved
    #[error("{message}")]
    UnknownEntity {
        /// Message shown to the caller
        message: String,
    },

    /// No attribute type definition is registered under this name
    #[error("Unknown attribute type: {name}")]
    UnknownType {
        /// Requested type name
        name: String,
    },

    /// A value references an Attribute that does not belong to the Entity
    #[error("Unknown attribute for {entity}: {attribute}")]
    UnknownAttribute {
        /// Full name of the Instance's Entity
        entity: String,
        /// Name of the foreign Attribute
        attribute: String,
    },

    /// Malformed configuration JSON, unknown field, or failed validator chain
    #[error("{message}")]
    InvalidConfiguration {
        /// Message shown to the caller
        message: String,
    },

    /// One or more Instance values failed validation
    #[error("{message}")]
    InvalidValue {
        /// Aggregated message shown to the caller
        message: String,
    },

    /// The type of an Attribute cannot change after creation
    #[error("Can not change the type of an attribute")]
    ImmutableType {
        /// Name of the Attribute
        attribute: String,
    },

    /// The source Instance of a Relation is absent or unknown
    #[error("Invalid argument: The source instance is mandatory!")]
    MissingSourceInstance,

    /// The target Instance of a Relation is absent or unknown
    #[error("Invalid argument: The target instance is mandatory!")]
    MissingTargetInstance,

    /// No Attribute with this id
    #[error("Attribute not found: {id}")]
    AttributeNotFound {
        /// Requested id
        id: u64,
    },

    /// No RelationType with this id
    #[error("Relation type not found: {id}")]
    RelationTypeNotFound {
        /// Requested id
        id: u64,
    },

    /// No Relation with this id
    #[error("Relation not found: {id}")]
    RelationNotFound {
        /// Requested id
        id: u64,
    },

    /// The stored version differs from the one carried by the update
    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionConflict {
        /// Version carried by the update
        expected: u64,
        /// Version currently stored
        actual: u64,
    },

    /// Store collaborator failure
    #[error("Storage error: {message}")]
    Storage {
        /// Message from the store
        message: String,
    },
}

impl MetadataError {
    /// Build an [`MetadataError::InvalidArgument`]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        MetadataError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Build an [`MetadataError::InvalidConfiguration`]
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        MetadataError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Build an [`MetadataError::UnknownEntity`]
    pub fn unknown_entity(message: impl Into<String>) -> Self {
        MetadataError::UnknownEntity {
            message: message.into(),
        }
    }

    /// Build a [`MetadataError::Storage`]
    pub fn storage(message: impl Into<String>) -> Self {
        MetadataError::Storage {
            message: message.into(),
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MetadataError::InvalidArgument { .. }
            | MetadataError::InvalidValue { .. }
            | MetadataError::UnknownAttribute { .. }
            | MetadataError::MissingSourceInstance
            | MetadataError::MissingTargetInstance => ErrorKind::Validation,
            MetadataError::DuplicateEntity { .. } | MetadataError::DuplicateAttribute { .. } => {
                ErrorKind::Duplicate
            }
            MetadataError::EntityNotFound { .. }
            | MetadataError::UnknownEntity { .. }
            | MetadataError::AttributeNotFound { .. }
            | MetadataError::RelationTypeNotFound { .. }
            | MetadataError::RelationNotFound { .. } => ErrorKind::NotFound,
            MetadataError::ImmutableType { .. } => ErrorKind::ImmutableField,
            MetadataError::InvalidConfiguration { .. } | MetadataError::UnknownType { .. } => {
                ErrorKind::Configuration
            }
            MetadataError::VersionConflict { .. } => ErrorKind::Conflict,
            MetadataError::Storage { .. } => ErrorKind::Storage,
        }
    }

    /// Check if this error indicates a lookup miss
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error is a validation error
    pub fn is_validation_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}
