//! Kernel configuration via `metakernel.toml`
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! stock behavior. Settings are read once when the kernel is built.

use std::path::Path;

use serde::{Deserialize, Serialize};

use metakernel_core::{is_valid_namespace, MetadataError, Result};
use metakernel_typesys::FieldNameCheck;

/// Config file name looked up by embedders.
pub const CONFIG_FILE_NAME: &str = "metakernel.toml";

/// Namespace token persisted for Entities created without a namespace.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Kernel configuration loaded from `metakernel.toml`.
///
/// # Example
///
/// ```toml
/// # Namespace stored for Entities created without one
/// default_namespace = "default"
///
/// # Unknown configuration fields: "first" or "all"
/// field_names = "first"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Token injected in place of an empty namespace at the store boundary.
    #[serde(default = "default_namespace_str")]
    pub default_namespace: String,
    /// How unknown Attribute configuration fields are reported.
    #[serde(default)]
    pub field_names: FieldNameCheck,
}

fn default_namespace_str() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            default_namespace: default_namespace_str(),
            field_names: FieldNameCheck::default(),
        }
    }
}

impl KernelConfig {
    /// Check the values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns an error if `default_namespace` is not a valid lower-case
    /// namespace.
    pub fn validate(&self) -> Result<()> {
        let token = &self.default_namespace;
        if !is_valid_namespace(token) || token.starts_with('.') || token.ends_with('.') {
            return Err(MetadataError::invalid_configuration(format!(
                "Invalid default_namespace '{}' in {}. Expected letters, digits and inner dots.",
                token, CONFIG_FILE_NAME
            )));
        }
        if token.to_lowercase() != *token {
            return Err(MetadataError::invalid_configuration(format!(
                "Invalid default_namespace '{}' in {}. Expected lower case.",
                token, CONFIG_FILE_NAME
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Metadata kernel configuration
#
# Namespace stored for Entities created without one. Callers never see it:
# it is stripped again on every read.
default_namespace = "default"

# Unknown Attribute configuration fields
#   "first" = report the first unknown field (default)
#   "all"   = report every unknown field in one error
field_names = "first"
"#
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: KernelConfig = toml::from_str(content).map_err(|e| {
            MetadataError::invalid_configuration(format!(
                "Failed to parse {}: {}",
                CONFIG_FILE_NAME, e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MetadataError::invalid_configuration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                MetadataError::invalid_configuration(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            MetadataError::invalid_configuration(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content).map_err(|e| {
            MetadataError::invalid_configuration(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
