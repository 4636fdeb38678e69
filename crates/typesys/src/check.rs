//! Configuration and value checks run by the managers
//!
//! Order for a configuration document:
//! 1. [`parse_configuration`]: must be a JSON object
//! 2. [`check_field_names`]: every field must be allowed by the type
//! 3. [`validate_configuration`]: run every chain validator, aggregate
//!
//! Order for an Instance value: [`validate_value`] runs the value-kind check
//! first, then the chain against the Attribute's configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use metakernel_core::{MetadataError, Result};

use crate::definition::AttributeTypeDefinition;
use crate::fields;
use crate::validator::ValidationError;

/// A parsed configuration document
pub type Configuration = serde_json::Map<String, JsonValue>;

/// Prefix of aggregated configuration errors
pub const CONFIGURATION_PREFIX: &str = "Invalid configuration for attribute";

/// How unknown configuration fields are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldNameCheck {
    /// Stop at the first unknown field, in document order
    #[default]
    #[serde(rename = "first")]
    FirstOffender,
    /// Report every unknown field
    #[serde(rename = "all")]
    CollectAll,
}

/// Parse a raw configuration into a JSON object
pub fn parse_configuration(raw: &str) -> Result<Configuration> {
    match serde_json::from_str::<JsonValue>(raw) {
        Ok(JsonValue::Object(map)) => Ok(map),
        _ => Err(MetadataError::InvalidConfiguration {
            message: format!("Invalid value for Attribute configuration: {}", raw),
        }),
    }
}

/// Reject fields the type does not declare
pub fn check_field_names(
    definition: &AttributeTypeDefinition,
    attribute_name: &str,
    config: &Configuration,
    mode: FieldNameCheck,
) -> Result<()> {
    let mut unknown = config
        .keys()
        .filter(|field| !definition.contains_configuration_field(field))
        .map(|field| {
            ValidationError::new(format!("the {} configuration attribute is unknown", field))
        });

    let errors: Vec<ValidationError> = match mode {
        FieldNameCheck::FirstOffender => unknown.next().into_iter().collect(),
        FieldNameCheck::CollectAll => unknown.collect(),
    };
    into_result(&errors, &configuration_prefix(attribute_name))
}

/// Run every validator of the chain against the configuration document
pub fn validate_configuration(
    definition: &AttributeTypeDefinition,
    attribute_name: &str,
    config: &Configuration,
) -> Result<()> {
    let mut errors = Vec::new();
    for validator in definition.validators() {
        validator.validate_default(&mut errors, config);
    }
    debug!(
        target: "metakernel::typesys",
        type_name = definition.name(),
        attribute = attribute_name,
        errors = errors.len(),
        "Validated attribute configuration"
    );
    into_result(&errors, &configuration_prefix(attribute_name))
}

/// Check one Instance value; returns the failures without a prefix
///
/// The chain only runs when the Attribute has a configuration.
pub fn validate_value(
    definition: &AttributeTypeDefinition,
    config: Option<&Configuration>,
    value: Option<&JsonValue>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let kind = definition.value_kind();
    if let Some(v) = value.filter(|v| !v.is_null()) {
        if !kind.coerces(v) {
            errors.push(ValidationError::new(format!(
                "the value must be {}",
                kind.describe()
            )));
        }
    }
    if let Some(config) = config {
        for validator in definition.validators() {
            validator.validate_value(&mut errors, config, value);
        }
    }
    errors
}

/// The configured default value, if any
pub fn default_value(config: &Configuration) -> Option<&JsonValue> {
    config.get(fields::DEFAULT).filter(|v| !v.is_null())
}

/// Join error messages behind a prefix; `None` when there are no errors
pub fn aggregate(errors: &[ValidationError], prefix: &str) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    let joined = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("{}{}", prefix, joined))
}

fn configuration_prefix(attribute_name: &str) -> String {
    format!("{} {}: ", CONFIGURATION_PREFIX, attribute_name)
}

fn into_result(errors: &[ValidationError], prefix: &str) -> Result<()> {
    match aggregate(errors, prefix) {
        Some(message) => Err(MetadataError::InvalidConfiguration { message }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(parse_configuration(r#"{"mandatory":true}"#).is_ok());
        for raw in ["[1]", "\"x\"", "{", ""] {
            let err = parse_configuration(raw).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Invalid value for Attribute configuration: {}", raw)
            );
        }
    }

    #[test]
    fn test_first_offender_in_document_order() {
        let text = AttributeTypeDefinition::text();
        let config = parse_configuration(r#"{"zeta":1,"alpha":2}"#).unwrap();
        let err = check_field_names(&text, "title", &config, FieldNameCheck::FirstOffender)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration for attribute title: the zeta configuration attribute is unknown"
        );
    }

    #[test]
    fn test_collect_all_unknown_fields() {
        let text = AttributeTypeDefinition::text();
        let config = parse_configuration(r#"{"zeta":1,"regex":"x","alpha":2}"#).unwrap();
        let err =
            check_field_names(&text, "title", &config, FieldNameCheck::CollectAll).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration for attribute title: the zeta configuration attribute is unknown, \
             the alpha configuration attribute is unknown"
        );
    }

    #[test]
    fn test_validate_configuration_aggregates() {
        let text = AttributeTypeDefinition::text();
        let config = parse_configuration(r#"{"minLength":5,"maxLength":3,"mandatory":"no"}"#)
            .unwrap();
        let err = validate_configuration(&text, "title", &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration for attribute title: the minLength (5) is greater than the \
             maxLength (3), the mandatory value must be a boolean"
        );
    }

    #[test]
    fn test_validate_value_kind_then_chain() {
        let integer = AttributeTypeDefinition::integer();
        let config = parse_configuration(r#"{"minValue":10}"#).unwrap();
        let errors = validate_value(&integer, Some(&config), Some(&json!("abc")));
        assert_eq!(errors, vec![ValidationError::new("the value must be an integer")]);

        let errors = validate_value(&integer, Some(&config), Some(&json!("3")));
        assert_eq!(
            errors,
            vec![ValidationError::new("the value must be greater than or equal to 10")]
        );
    }

    #[test]
    fn test_validate_value_without_configuration() {
        let text = AttributeTypeDefinition::text();
        assert!(validate_value(&text, None, None).is_empty());
        assert_eq!(validate_value(&text, None, Some(&json!(1))).len(), 1);
    }

    #[test]
    fn test_field_name_check_serde() {
        let mode: FieldNameCheck = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(mode, FieldNameCheck::CollectAll);
        assert_eq!(FieldNameCheck::default(), FieldNameCheck::FirstOffender);
    }

    #[test]
    fn test_aggregate() {
        assert_eq!(aggregate(&[], "p: "), None);
        let errors = vec![ValidationError::new("a"), ValidationError::new("b")];
        assert_eq!(aggregate(&errors, "p: "), Some("p: a, b".to_string()));
    }

    #[test]
    fn test_default_value() {
        let config = parse_configuration(r#"{"default":"x"}"#).unwrap();
        assert_eq!(default_value(&config), Some(&json!("x")));
        let config = parse_configuration(r#"{"default":null}"#).unwrap();
        assert_eq!(default_value(&config), None);
    }
}
