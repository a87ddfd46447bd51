//! Per-entity validation configuration

use crate::core::field::FieldFormat;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Constraints on a single field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRule {
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Written `format: email` or `format: { custom: "^[A-Z_]+$" }` in YAML
    #[serde(
        with = "serde_yaml::with::singleton_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub format: Option<FieldFormat>,
}

impl FieldRule {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn optional() -> Self {
        Self::default()
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Ordered field → rule map for one entity type
///
/// Fields are checked in insertion order, which is also the order of the
/// reported violations.
///
/// ```yaml
/// fields:
///   login: { required: true, min_length: 3 }
///   email: { required: true, format: email }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityValidationConfig {
    #[serde(default)]
    pub fields: IndexMap<String, FieldRule>,
}

impl EntityValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rule of a field
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.insert(name.into(), rule);
        self
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.fields.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Overlay another configuration; its rules win on conflicting fields
    pub fn merge(&mut self, other: EntityValidationConfig) {
        for (name, rule) in other.fields {
            self.fields.insert(name, rule);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let config = EntityValidationConfig::new()
            .field("login", FieldRule::required().min_length(3))
            .field("email", FieldRule::required().format(FieldFormat::Email));

        let names: Vec<&str> = config.fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["login", "email"]);
        assert_eq!(config.rule("login").unwrap().min_length, Some(3));
    }

    #[test]
    fn test_yaml_config() {
        let yaml = r#"
            fields:
              code:
                required: true
                format:
                  custom: "^[A-Z_]+$"
              description:
                max_length: 200
        "#;

        let config: EntityValidationConfig = serde_yaml::from_str(yaml).unwrap();
        let code = config.rule("code").unwrap();
        assert!(code.required);
        assert_eq!(code.format, Some(FieldFormat::Custom("^[A-Z_]+$".to_string())));
        assert!(!config.rule("description").unwrap().required);
    }

    #[test]
    fn test_yaml_format_shapes() {
        let yaml = r#"
            fields:
              email: { required: true, format: email }
              code: { format: { custom: "^[A-Z]+$" } }
              note: { max_length: 10 }
        "#;

        let config: EntityValidationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.rule("email").unwrap().format, Some(FieldFormat::Email));
        assert_eq!(
            config.rule("code").unwrap().format,
            Some(FieldFormat::Custom("^[A-Z]+$".to_string()))
        );
        assert_eq!(config.rule("note").unwrap().format, None);

        let written = serde_yaml::to_string(&config).unwrap();
        assert!(written.contains("custom:"));
        assert!(!written.contains('!'));
        assert_eq!(serde_yaml::from_str::<EntityValidationConfig>(&written).unwrap(), config);
    }

    #[test]
    fn test_merge_overrides_rules() {
        let mut base = EntityValidationConfig::new().field("name", FieldRule::required());
        base.merge(EntityValidationConfig::new().field("name", FieldRule::optional()));
        assert!(!base.rule("name").unwrap().required);
    }
}
