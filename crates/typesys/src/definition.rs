//! Attribute type definitions and the built-in types

use metakernel_core::AttributeType;

use crate::fields;
use crate::rule::Rule;
use crate::validator::AttributeValidator;
use crate::value_kind::ValueKind;

/// Behavior of one attribute type
///
/// Built with [`AttributeTypeDefinition::new`] and the chained `field` and
/// `validator` calls. Validators run in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeDefinition {
    name: String,
    value_kind: ValueKind,
    allowed_fields: Vec<&'static str>,
    validators: Vec<AttributeValidator>,
}

impl AttributeTypeDefinition {
    /// Start a definition with no fields and an empty chain
    pub fn new(name: impl Into<String>, value_kind: ValueKind) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            value_kind,
            allowed_fields: Vec::new(),
            validators: Vec::new(),
        }
    }

    /// Allow a configuration field
    pub fn field(mut self, field: &'static str) -> Self {
        self.allowed_fields.push(field);
        self
    }

    /// Append a validator to the chain
    pub fn validator(mut self, validator: AttributeValidator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Upper-case type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind every Instance value must have
    pub fn value_kind(&self) -> ValueKind {
        self.value_kind
    }

    /// Allowed configuration fields, in declaration order
    pub fn allowed_fields(&self) -> &[&'static str] {
        &self.allowed_fields
    }

    /// The validator chain
    pub fn validators(&self) -> &[AttributeValidator] {
        &self.validators
    }

    /// Whether `field` may appear in a configuration (exact match)
    pub fn contains_configuration_field(&self, field: &str) -> bool {
        self.allowed_fields.iter().any(|f| *f == field)
    }

    /// Definition of a built-in type; `None` for a custom one
    pub fn builtin(attribute_type: &AttributeType) -> Option<Self> {
        let definition = match attribute_type {
            AttributeType::Text => Self::text(),
            AttributeType::LongText => Self::long_text(),
            AttributeType::Integer => Self::integer(),
            AttributeType::Password => Self::password(),
            AttributeType::Object => Self::object(),
            AttributeType::Custom(_) => return None,
        };
        Some(definition)
    }

    /// Single-line text with an optional regex
    pub fn text() -> Self {
        Self::new(AttributeType::Text.name(), ValueKind::Text)
            .field(fields::MANDATORY)
            .field(fields::DEFAULT)
            .field(fields::MIN_LENGTH)
            .field(fields::MAX_LENGTH)
            .field(fields::REGEX)
            .validator(AttributeValidator::Mandatory)
            .validator(AttributeValidator::with_value(fields::REGEX, Rule::Regex))
            .validator(AttributeValidator::field(fields::DEFAULT, ValueKind::Text))
            .validator(AttributeValidator::with_value(fields::MIN_LENGTH, Rule::MinLength))
            .validator(AttributeValidator::with_value(fields::MAX_LENGTH, Rule::MaxLength))
            .validator(AttributeValidator::min_and_max(fields::MAX_LENGTH, fields::MIN_LENGTH))
            .validator(AttributeValidator::field(fields::MANDATORY, ValueKind::Boolean))
    }

    /// Multi-line text
    pub fn long_text() -> Self {
        Self::new(AttributeType::LongText.name(), ValueKind::Text)
            .field(fields::MANDATORY)
            .field(fields::DEFAULT)
            .field(fields::MIN_LENGTH)
            .field(fields::MAX_LENGTH)
            .validator(AttributeValidator::Mandatory)
            .validator(AttributeValidator::field(fields::DEFAULT, ValueKind::Text))
            .validator(AttributeValidator::with_value(fields::MIN_LENGTH, Rule::MinLength))
            .validator(AttributeValidator::with_value(fields::MAX_LENGTH, Rule::MaxLength))
            .validator(AttributeValidator::min_and_max(fields::MAX_LENGTH, fields::MIN_LENGTH))
            .validator(AttributeValidator::field(fields::MANDATORY, ValueKind::Boolean))
    }

    /// Whole numbers
    pub fn integer() -> Self {
        Self::new(AttributeType::Integer.name(), ValueKind::Integer)
            .field(fields::MANDATORY)
            .field(fields::DEFAULT)
            .field(fields::MIN_VALUE)
            .field(fields::MAX_VALUE)
            .validator(AttributeValidator::Mandatory)
            .validator(AttributeValidator::field(fields::DEFAULT, ValueKind::Integer))
            .validator(AttributeValidator::with_value(fields::MIN_VALUE, Rule::MinValue))
            .validator(AttributeValidator::with_value(fields::MAX_VALUE, Rule::MaxValue))
            .validator(AttributeValidator::min_and_max(fields::MAX_VALUE, fields::MIN_VALUE))
            .validator(AttributeValidator::field(fields::MANDATORY, ValueKind::Boolean))
    }

    /// Text with strength rules
    pub fn password() -> Self {
        Self::new(AttributeType::Password.name(), ValueKind::Text)
            .field(fields::MANDATORY)
            .field(fields::DEFAULT)
            .field(fields::MIN_LENGTH)
            .field(fields::MAX_LENGTH)
            .field(fields::MIN_UPPERS)
            .field(fields::MIN_NUMBERS)
            .field(fields::MIN_SYMBOLS)
            .field(fields::MAX_REPEAT)
            .validator(AttributeValidator::Mandatory)
            .validator(AttributeValidator::field(fields::DEFAULT, ValueKind::Text))
            .validator(AttributeValidator::with_value(fields::MIN_LENGTH, Rule::MinLength))
            .validator(AttributeValidator::with_value(fields::MAX_LENGTH, Rule::MaxLength))
            .validator(AttributeValidator::min_and_max(fields::MAX_LENGTH, fields::MIN_LENGTH))
            .validator(AttributeValidator::with_value(fields::MIN_UPPERS, Rule::MinUppers))
            .validator(AttributeValidator::with_value(fields::MIN_NUMBERS, Rule::MinNumbers))
            .validator(AttributeValidator::with_value(fields::MIN_SYMBOLS, Rule::MinSymbols))
            .validator(AttributeValidator::with_value(fields::MAX_REPEAT, Rule::MaxRepeat))
            .validator(AttributeValidator::field(fields::MANDATORY, ValueKind::Boolean))
    }

    /// Arbitrary JSON
    pub fn object() -> Self {
        Self::new(AttributeType::Object.name(), ValueKind::Any)
            .field(fields::MANDATORY)
            .field(fields::DEFAULT)
            .validator(AttributeValidator::Mandatory)
            .validator(AttributeValidator::field(fields::MANDATORY, ValueKind::Boolean))
    }
}
