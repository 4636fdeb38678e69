//! Validators that make up an attribute type's chain
//!
//! Validators are plain data. Each one can check the configuration document
//! itself ([`AttributeValidator::validate_default`]) and a candidate Instance
//! value against that configuration ([`AttributeValidator::validate_value`]).
//! Both push into a shared error list so a chain reports every failure.

use std::fmt;

use serde_json::Value as JsonValue;

use crate::check::Configuration;
use crate::fields;
use crate::rule::Rule;
use crate::value_kind::ValueKind;

/// One validation failure, lower-case and without a trailing period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Human-readable message
    pub message: String,
}

impl ValidationError {
    /// Create a validation error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A single link in an attribute type's validator chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValidator {
    /// A present value is required when `mandatory` is `true`
    Mandatory,
    /// A configuration field, when present, has the given kind
    ConfigurationField {
        /// Field name
        field: &'static str,
        /// Required kind
        kind: ValueKind,
    },
    /// A bounded field whose rule applies to the default and to values
    WithValue {
        /// Bound field name, e.g. `minLength`
        field: &'static str,
        /// Field holding the default value
        default_field: &'static str,
        /// Rule tying the bound to a candidate
        rule: Rule,
        /// Required kind of the bound
        kind: ValueKind,
    },
    /// Two bounds, when both present, are not inverted
    MinAndMax {
        /// Upper bound field
        max_field: &'static str,
        /// Lower bound field
        min_field: &'static str,
    },
}

impl AttributeValidator {
    /// Field validator shorthand
    pub fn field(field: &'static str, kind: ValueKind) -> Self {
        AttributeValidator::ConfigurationField { field, kind }
    }

    /// Bounded field shorthand; the bound kind follows the rule
    pub fn with_value(field: &'static str, rule: Rule) -> Self {
        AttributeValidator::WithValue {
            field,
            default_field: fields::DEFAULT,
            rule,
            kind: rule.bound_kind(),
        }
    }

    /// Min/max shorthand
    pub fn min_and_max(max_field: &'static str, min_field: &'static str) -> Self {
        AttributeValidator::MinAndMax {
            max_field,
            min_field,
        }
    }

    /// Check the configuration document
    pub fn validate_default(&self, errors: &mut Vec<ValidationError>, config: &Configuration) {
        match self {
            AttributeValidator::Mandatory => {}
            AttributeValidator::ConfigurationField { field, kind } => {
                if let Some(value) = present(config, field) {
                    if !kind.matches(value) {
                        errors.push(wrong_kind(field, *kind));
                    }
                }
            }
            AttributeValidator::WithValue {
                field,
                default_field,
                rule,
                kind,
            } => {
                let Some(bound) = present(config, field) else {
                    return;
                };
                if !kind.matches(bound) {
                    errors.push(wrong_kind(field, *kind));
                    return;
                }
                if let Some(message) = rule.check_bound(field, bound) {
                    errors.push(ValidationError::new(message));
                    return;
                }
                if let Some(default) = present(config, default_field) {
                    if let Some(predicate) = rule.check(bound, default) {
                        errors.push(ValidationError::new(format!(
                            "the default value {}",
                            predicate
                        )));
                    }
                }
            }
            AttributeValidator::MinAndMax {
                max_field,
                min_field,
            } => {
                let min = present(config, min_field).and_then(JsonValue::as_i64);
                let max = present(config, max_field).and_then(JsonValue::as_i64);
                if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        errors.push(ValidationError::new(format!(
                            "the {} ({}) is greater than the {} ({})",
                            min_field, min, max_field, max
                        )));
                    }
                }
            }
        }
    }

    /// Check a candidate value against the configuration
    ///
    /// `None` and JSON `null` both mean the value is unset.
    pub fn validate_value(
        &self,
        errors: &mut Vec<ValidationError>,
        config: &Configuration,
        value: Option<&JsonValue>,
    ) {
        let value = value.filter(|v| !v.is_null());
        match self {
            AttributeValidator::Mandatory => {
                let mandatory = config.get(fields::MANDATORY).and_then(JsonValue::as_bool);
                if mandatory == Some(true) && value.is_none() {
                    errors.push(ValidationError::new("the value is mandatory"));
                }
            }
            AttributeValidator::WithValue {
                field, rule, kind, ..
            } => {
                let (Some(bound), Some(value)) = (present(config, field), value) else {
                    return;
                };
                if !kind.matches(bound) || rule.check_bound(field, bound).is_some() {
                    return;
                }
                if let Some(predicate) = rule.check(bound, value) {
                    errors.push(ValidationError::new(format!("the value {}", predicate)));
                }
            }
            AttributeValidator::ConfigurationField { .. } | AttributeValidator::MinAndMax { .. } => {}
        }
    }
}

fn present<'a>(config: &'a Configuration, field: &str) -> Option<&'a JsonValue> {
    config.get(field).filter(|v| !v.is_null())
}

fn wrong_kind(field: &str, kind: ValueKind) -> ValidationError {
    ValidationError::new(format!("the {} value must be {}", field, kind.describe()))
}
