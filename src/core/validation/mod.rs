//! Pre-submission validation of records
//!
//! Validation is a pure function of an [`EntityValidationConfig`] and a
//! record: it reads fields through [`Record::field_value`] and returns the
//! list of violations, empty when the record may be saved.

pub mod config;

pub use config::{EntityValidationConfig, FieldRule};

use crate::core::field::FieldValue;
use crate::core::record::Record;
use serde::Serialize;

/// Why a field was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    Required,
    MinLength { min: usize, actual: usize },
    MaxLength { max: usize, actual: usize },
    Format { format: String },
}

/// A single field validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    #[serde(flatten)]
    pub kind: ViolationKind,
    pub message: String,
}

/// Check a record against its rules
pub fn validate<T: Record>(config: &EntityValidationConfig, record: &T) -> Vec<Violation> {
    config
        .fields
        .iter()
        .filter_map(|(field, rule)| {
            let value = record.field_value(field).unwrap_or(FieldValue::Null);
            check_field(field, rule, &value)
        })
        .collect()
}

/// First violation of one field, if any
///
/// A blank optional field is valid whatever its other constraints.
pub fn check_field(field: &str, rule: &FieldRule, value: &FieldValue) -> Option<Violation> {
    let violation = |kind: ViolationKind, message: String| Violation {
        field: field.to_string(),
        kind,
        message,
    };

    if value.is_blank() {
        return rule
            .required
            .then(|| violation(ViolationKind::Required, format!("'{}' is required", field)));
    }

    if let Some(text) = value.as_string() {
        let actual = text.chars().count();

        if let Some(min) = rule.min_length.filter(|min| actual < *min) {
            return Some(violation(
                ViolationKind::MinLength { min, actual },
                format!("'{}' must have at least {} characters", field, min),
            ));
        }

        if let Some(max) = rule.max_length.filter(|max| actual > *max) {
            return Some(violation(
                ViolationKind::MaxLength { max, actual },
                format!("'{}' must not exceed {} characters", field, max),
            ));
        }
    }

    match &rule.format {
        Some(format) if !format.validate(value) => Some(violation(
            ViolationKind::Format {
                format: format.name().to_string(),
            },
            format!("'{}' is not a valid {}", field, format.name()),
        )),
        _ => None,
    }
}
