//! Field value types and format checks

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;
use validator::{ValidateEmail, ValidateUrl};

/// A polymorphic scalar that can hold any searchable field of a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a UUID if possible
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            FieldValue::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Null, or a string that is empty once trimmed
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the value the way it travels in query parameters
    pub fn to_wire(&self) -> String {
        match self {
            FieldValue::String(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Uuid(u) => u.to_string(),
            FieldValue::DateTime(dt) => dt.to_rfc3339(),
            FieldValue::Null => "null".to_string(),
        }
    }

    /// Reinterpret a wire string as the same variant as `target`
    ///
    /// Values parsed from query parameters are always strings; comparing them
    /// against typed record fields requires converting them first. Values that
    /// do not parse are returned unchanged.
    pub fn coerce_to(&self, target: &FieldValue) -> FieldValue {
        let FieldValue::String(raw) = self else {
            return self.clone();
        };

        let coerced = match target {
            FieldValue::Integer(_) => raw.parse().ok().map(FieldValue::Integer),
            FieldValue::Float(_) => raw.parse().ok().map(FieldValue::Float),
            FieldValue::Boolean(_) => raw.parse().ok().map(FieldValue::Boolean),
            FieldValue::Uuid(_) => Uuid::parse_str(raw).ok().map(FieldValue::Uuid),
            FieldValue::DateTime(_) => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| FieldValue::DateTime(dt.with_timezone(&Utc))),
            FieldValue::Null if raw == "null" => Some(FieldValue::Null),
            _ => None,
        };

        coerced.unwrap_or_else(|| self.clone())
    }

    /// Total order used for sorting and range comparisons
    ///
    /// Null sorts first, integers and floats compare numerically, and values
    /// of unrelated variants fall back to a fixed variant rank.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        use FieldValue as V;

        match (self, other) {
            (V::String(a), V::String(b)) => a.cmp(b),
            (V::Integer(a), V::Integer(b)) => a.cmp(b),
            (V::Float(a), V::Float(b)) => a.total_cmp(b),
            (V::Integer(a), V::Float(b)) => (*a as f64).total_cmp(b),
            (V::Float(a), V::Integer(b)) => a.total_cmp(&(*b as f64)),
            (V::Boolean(a), V::Boolean(b)) => a.cmp(b),
            (V::Uuid(a), V::Uuid(b)) => a.cmp(b),
            (V::DateTime(a), V::DateTime(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Boolean(_) => 1,
            FieldValue::Integer(_) | FieldValue::Float(_) => 2,
            FieldValue::DateTime(_) => 3,
            FieldValue::Uuid(_) => 4,
            FieldValue::String(_) => 5,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Field formats checked by entity validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFormat {
    Email,
    Uuid,
    Url,
    Phone,
    /// Regular expression the whole value must match
    Custom(String),
}

impl FieldFormat {
    /// Validate a field value against this format
    pub fn validate(&self, value: &FieldValue) -> bool {
        if let (FieldFormat::Uuid, FieldValue::Uuid(_)) = (self, value) {
            return true;
        }

        let Some(string_value) = value.as_string() else {
            return false;
        };

        match self {
            FieldFormat::Email => string_value.validate_email(),
            FieldFormat::Uuid => Uuid::parse_str(string_value).is_ok(),
            FieldFormat::Url => string_value.validate_url(),
            FieldFormat::Phone => Self::is_valid_phone(string_value),
            FieldFormat::Custom(pattern) => Regex::new(pattern)
                .map(|regex| regex.is_match(string_value))
                .unwrap_or(false),
        }
    }

    /// Short name used in violation messages
    pub fn name(&self) -> &str {
        match self {
            FieldFormat::Email => "email",
            FieldFormat::Uuid => "uuid",
            FieldFormat::Url => "url",
            FieldFormat::Phone => "phone",
            FieldFormat::Custom(_) => "custom",
        }
    }

    fn is_valid_phone(phone: &str) -> bool {
        static PHONE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
        // At least 8 digits, max 15 (E.164)
        PHONE_REGEX
            .get_or_init(|| Regex::new(r"^\+?[1-9]\d{7,14}$").ok())
            .as_ref()
            .is_some_and(|regex| regex.is_match(phone))
    }
}
