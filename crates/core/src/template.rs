//! Case template shapes as exchanged with the template store.
//!
//! The wire format is camelCase JSON. Severity and TLP travel as small
//! integers; custom-field values are maps tagged by their value type, e.g.
//! `{"string": null, "order": 1}`.

use std::collections::BTreeMap;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{nullable, TemplateId};

/// Keys owned by the store, never sent back in a create/update body.
pub const SERVER_FIELDS: &[&str] = &[
    "id",
    "_type",
    "user",
    "createdAt",
    "createdBy",
    "updatedAt",
    "updatedBy",
];

/* --------------------------------------------------------------------------
   Severity / TLP
   -------------------------------------------------------------------------- */

/// Case severity, stored as `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Severity {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl TryFrom<u8> for Severity {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            4 => Ok(Self::Critical),
            other => Err(CoreError::Validation(format!(
                "Severity must be between 1 and 4, got {other}"
            ))),
        }
    }
}

impl From<Severity> for u8 {
    fn from(value: Severity) -> Self {
        value as u8
    }
}

/// Traffic Light Protocol level, stored as `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tlp {
    White = 0,
    Green = 1,
    #[default]
    Amber = 2,
    Red = 3,
}

impl TryFrom<u8> for Tlp {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::White),
            1 => Ok(Self::Green),
            2 => Ok(Self::Amber),
            3 => Ok(Self::Red),
            other => Err(CoreError::Validation(format!(
                "TLP must be between 0 and 3, got {other}"
            ))),
        }
    }
}

impl From<Tlp> for u8 {
    fn from(value: Tlp) -> Self {
        value as u8
    }
}

/* --------------------------------------------------------------------------
   Task
   -------------------------------------------------------------------------- */

/// A task blueprint copied into every case created from the template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Zero-based position in the template's task list.
    #[serde(default, deserialize_with = "nullable")]
    pub order: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Login of the default assignee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Attributes not modelled above (due dates, ...), passed through as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Task {
    /// A task with only a title, placed at `order`.
    pub fn titled(title: impl Into<String>, order: u32) -> Self {
        Self {
            order,
            title: title.into(),
            ..Default::default()
        }
    }
}

/* --------------------------------------------------------------------------
   Custom field slot
   -------------------------------------------------------------------------- */

/// A custom field attached to a template.
///
/// On the wire this is `{"<type>": <value>, "order": <n>}`; the type key is
/// the field's declared value type (`string`, `number`, `boolean`, `date`...).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomFieldSlot {
    pub field_type: Option<String>,
    pub value: serde_json::Value,
    pub order: Option<u32>,
}

impl CustomFieldSlot {
    /// An empty slot of the given type at a 1-based position.
    pub fn empty(field_type: impl Into<String>, order: u32) -> Self {
        Self {
            field_type: Some(field_type.into()),
            value: serde_json::Value::Null,
            order: Some(order),
        }
    }
}

impl Serialize for CustomFieldSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = usize::from(self.field_type.is_some()) + usize::from(self.order.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(field_type) = &self.field_type {
            map.serialize_entry(field_type, &self.value)?;
        }
        if let Some(order) = self.order {
            map.serialize_entry("order", &order)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CustomFieldSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map =
            Option::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?
                .unwrap_or_default();

        let order = match map.remove("order") {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => {
                let n = value
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| {
                        <D::Error as serde::de::Error>::custom(format!(
                            "invalid custom field order: {value}"
                        ))
                    })?;
                Some(n)
            }
        };

        let (field_type, value) = match map.into_iter().next() {
            Some((field_type, value)) => (Some(field_type), value),
            None => (None, serde_json::Value::Null),
        };

        Ok(Self {
            field_type,
            value,
            order,
        })
    }
}

/* --------------------------------------------------------------------------
   Case template
   -------------------------------------------------------------------------- */

/// The editable part of a case template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseTemplate {
    /// Assigned by the store; absent on templates that were never saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TemplateId>,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub title_prefix: String,
    #[serde(default, deserialize_with = "nullable")]
    pub severity: Severity,
    #[serde(default, deserialize_with = "nullable")]
    pub tlp: Tlp,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tasks: Vec<Task>,
    /// Metric defaults, kept in their wire form (`5` stays `5`).
    #[serde(default, deserialize_with = "nullable")]
    pub metrics: BTreeMap<String, Option<serde_json::Number>>,
    #[serde(default, deserialize_with = "nullable")]
    pub custom_fields: BTreeMap<String, CustomFieldSlot>,
    /// Top-level attributes not modelled above (`pap`, `flag`, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CaseTemplate {
    /// A blank, never-persisted template (severity medium, TLP amber).
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// JSON body of the template without its `id` or other
    /// [`SERVER_FIELDS`].
    ///
    /// Used both as the create/update payload and as the export file body.
    pub fn to_body(&self) -> Result<serde_json::Value, CoreError> {
        let mut body = serde_json::to_value(self)?;
        if let Some(map) = body.as_object_mut() {
            for key in SERVER_FIELDS {
                map.remove(*key);
            }
        }
        Ok(body)
    }
}

/// A template as returned by the store, including server-owned metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTemplate {
    #[serde(flatten)]
    pub template: CaseTemplate,
    #[serde(rename = "_type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

impl StoredTemplate {
    pub fn id(&self) -> Option<&str> {
        self.template.id.as_deref()
    }

    /// Drop the server-owned metadata, keeping only the editable template.
    pub fn into_template(self) -> CaseTemplate {
        self.template
    }
}

impl From<CaseTemplate> for StoredTemplate {
    fn from(template: CaseTemplate) -> Self {
        Self {
            template,
            kind: None,
            user: None,
            created_at: None,
            created_by: None,
            updated_at: None,
            updated_by: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
