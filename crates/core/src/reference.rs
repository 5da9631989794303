//! Globally defined metrics, custom fields and users referenced by templates.

use serde::{Deserialize, Serialize};

use crate::types::nullable;

/// A case metric definition. Templates reference metrics by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
}

/// A custom field definition. Templates reference fields by `reference`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldDefinition {
    pub reference: String,
    /// Display name, used in user-facing messages.
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    /// Declared value type, e.g. `string`, `number`, `boolean`, `date`.
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub options: Vec<serde_json::Value>,
}

/// A user that tasks may be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login, stored as the task `owner`.
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}
