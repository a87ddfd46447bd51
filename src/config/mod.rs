//! Configuration loading and management

use crate::core::field::FieldFormat;
use crate::core::query::DEFAULT_PAGE_SIZE;
use crate::core::validation::{EntityValidationConfig, FieldRule};
use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> usize {
    100
}

/// A many-to-many association edited from the owner's screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationDefinition {
    /// Singular name of the owner aggregate (e.g., "role")
    pub owner: String,

    /// Singular name of the attached records (e.g., "privilege")
    pub target: String,

    /// Field of the owner holding the association list (e.g., "privileges")
    pub field: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Complete configuration of the console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Page size of a fresh search
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Largest page size the backend will serve
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Validation rules keyed by singular entity name
    #[serde(default)]
    pub entities: IndexMap<String, EntityValidationConfig>,

    #[serde(default)]
    pub associations: Vec<AssociationDefinition>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            entities: IndexMap::new(),
            associations: Vec::new(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Merge several configurations, later ones overriding earlier ones
    ///
    /// Page sizes come from the last configuration, validation rules are
    /// merged field by field and associations are deduplicated on
    /// `(owner, field)`.
    pub fn merge(configs: Vec<Self>) -> Self {
        let mut merged = Self::default();

        for config in configs {
            merged.default_page_size = config.default_page_size;
            merged.max_page_size = config.max_page_size;

            for (entity, rules) in config.entities {
                merged.entities.entry(entity).or_default().merge(rules);
            }

            for association in config.associations {
                match merged
                    .associations
                    .iter_mut()
                    .find(|a| a.owner == association.owner && a.field == association.field)
                {
                    Some(existing) => *existing = association,
                    None => merged.associations.push(association),
                }
            }
        }

        merged
    }

    /// Validation rules of an entity, empty when none are configured
    pub fn validation_for(&self, entity: &str) -> EntityValidationConfig {
        self.entities.get(entity).cloned().unwrap_or_default()
    }

    /// Associations edited from an owner's screen
    pub fn associations_of<'a>(
        &'a self,
        owner: &'a str,
    ) -> impl Iterator<Item = &'a AssociationDefinition> + 'a {
        self.associations.iter().filter(move |a| a.owner == owner)
    }

    /// Bound a requested page size to `1..=max_page_size`
    pub fn clamp_page_size(&self, requested: usize) -> usize {
        requested.clamp(1, self.max_page_size.max(1))
    }

    /// Configuration of the bundled identity and directory records
    pub fn default_config() -> Self {
        let association = |owner: &str, target: &str, field: &str, description: &str| {
            AssociationDefinition {
                owner: owner.to_string(),
                target: target.to_string(),
                field: field.to_string(),
                description: Some(description.to_string()),
            }
        };

        let mut entities = IndexMap::new();
        entities.insert(
            "privilege".to_string(),
            EntityValidationConfig::new()
                .field(
                    "name",
                    FieldRule::required()
                        .max_length(64)
                        .format(FieldFormat::Custom("^[A-Z][A-Z0-9_]*$".to_string())),
                )
                .field("description", FieldRule::optional().max_length(255)),
        );
        entities.insert(
            "role".to_string(),
            EntityValidationConfig::new()
                .field("name", FieldRule::required().min_length(2).max_length(64))
                .field("description", FieldRule::optional().max_length(255)),
        );
        entities.insert(
            "group".to_string(),
            EntityValidationConfig::new()
                .field("name", FieldRule::required().min_length(2).max_length(64))
                .field("description", FieldRule::optional().max_length(255)),
        );
        entities.insert(
            "user".to_string(),
            EntityValidationConfig::new()
                .field("login", FieldRule::required().min_length(3).max_length(32))
                .field("name", FieldRule::required().max_length(128))
                .field("email", FieldRule::required().format(FieldFormat::Email)),
        );
        entities.insert(
            "account".to_string(),
            EntityValidationConfig::new()
                .field("name", FieldRule::required().max_length(128))
                .field("email", FieldRule::optional().format(FieldFormat::Email))
                .field("phone", FieldRule::optional().format(FieldFormat::Phone)),
        );
        entities.insert(
            "contact".to_string(),
            EntityValidationConfig::new()
                .field("name", FieldRule::required().max_length(128))
                .field("email", FieldRule::required().format(FieldFormat::Email))
                .field("phone", FieldRule::optional().format(FieldFormat::Phone)),
        );

        Self {
            entities,
            associations: vec![
                association("role", "privilege", "privileges", "Privileges granted by a role"),
                association("role", "user", "users", "Users holding a role"),
                association("group", "role", "roles", "Roles granted to a group"),
                association("account", "contact", "contacts", "Contacts of an account"),
            ],
            ..Self::default()
        }
    }
}
