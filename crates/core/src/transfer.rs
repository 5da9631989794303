//! Template export/import as standalone JSON files.
//!
//! Exports carry the template body without its `id`. Imports keep only a
//! fixed set of top-level keys so that files exported from other instances
//! (or edited by hand) never smuggle server-owned fields into a create call.

use serde::Serialize;

use crate::error::CoreError;
use crate::template::CaseTemplate;

/// Prefix of every exported template file name.
pub const EXPORT_FILE_PREFIX: &str = "Case-Template__";

/// Top-level keys kept from an imported file.
pub const IMPORT_FIELDS: &[&str] = &[
    "name",
    "title",
    "description",
    "tlp",
    "severity",
    "tags",
    "status",
    "titlePrefix",
    "tasks",
    "metrics",
    "customFields",
];

/// A file ready to be handed to a file saver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedFile {
    pub file_name: String,
    pub contents: String,
}

/// `Case-Template__<name>.json` with every whitespace character replaced by `_`.
///
/// ```
/// use casetpl_core::transfer::export_file_name;
///
/// assert_eq!(export_file_name("My Template"), "Case-Template__My_Template.json");
/// assert_eq!(export_file_name("a\tb  c"), "Case-Template__a_b__c.json");
/// ```
pub fn export_file_name(template_name: &str) -> String {
    let sanitized: String = template_name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{EXPORT_FILE_PREFIX}{sanitized}.json")
}

/// Serialize `template` (minus its id) into an export file.
pub fn export_template(template: &CaseTemplate) -> Result<ExportedFile, CoreError> {
    let body = template.to_body()?;
    Ok(ExportedFile {
        file_name: export_file_name(&template.name),
        contents: serde_json::to_string(&body)?,
    })
}

/// Keep only the [`IMPORT_FIELDS`] keys of a parsed import file.
pub fn whitelist(
    value: serde_json::Value,
) -> Result<serde_json::Map<String, serde_json::Value>, CoreError> {
    match value {
        serde_json::Value::Object(mut map) => {
            map.retain(|key, _| IMPORT_FIELDS.contains(&key.as_str()));
            Ok(map)
        }
        other => Err(CoreError::Parse(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
    }
}

/// Parse the text of an import file into a new, id-less template.
pub fn parse_import(text: &str) -> Result<CaseTemplate, CoreError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| CoreError::Parse(e.to_string()))?;
    let fields = whitelist(value)?;
    serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(|e| CoreError::Parse(e.to_string()))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::template::{Severity, Task};

    #[test]
    fn export_strips_id_and_names_file() {
        let template = CaseTemplate {
            id: Some("AV42".into()),
            name: "My Template".into(),
            severity: Severity::High,
            tasks: vec![Task::titled("Triage", 0)],
            ..Default::default()
        };
        let file = export_template(&template).unwrap();
        assert_eq!(file.file_name, "Case-Template__My_Template.json");

        let body: serde_json::Value = serde_json::from_str(&file.contents).unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["name"], "My Template");
        assert_eq!(body["severity"], 3);
        assert_eq!(body["tasks"][0]["title"], "Triage");
    }

    #[test]
    fn whitelist_drops_unknown_keys() {
        let fields = whitelist(json!({
            "name": "X",
            "tasks": [{ "order": 0 }],
            "extraField": "ignored",
            "id": "AV1",
            "_type": "caseTemplate"
        }))
        .unwrap();

        let mut keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["name", "tasks"]);
    }

    #[test]
    fn parse_import_yields_new_template() {
        let template =
            parse_import(r#"{"name":"X","tasks":[{"order":0}],"extraField":"ignored","id":"AV1"}"#)
                .unwrap();
        assert_eq!(template.name, "X");
        assert!(template.id.is_none());
        assert_eq!(template.tasks.len(), 1);
        assert_eq!(template.tasks[0].order, 0);
    }

    #[test]
    fn parse_import_keeps_title_and_status() {
        let template =
            parse_import(r#"{"name":"X","title":"Case title","status":"Ok"}"#).unwrap();
        assert_eq!(template.title.as_deref(), Some("Case title"));
        assert_eq!(template.status.as_deref(), Some("Ok"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert_matches!(parse_import("{not json"), Err(CoreError::Parse(_)));
    }

    #[test]
    fn non_object_json_is_a_parse_error() {
        assert_matches!(
            parse_import("[1, 2]"),
            Err(CoreError::Parse(msg)) if msg.contains("an array")
        );
    }

    #[test]
    fn invalid_field_types_are_a_parse_error() {
        assert_matches!(
            parse_import(r#"{"name":"X","tlp":9}"#),
            Err(CoreError::Parse(_))
        );
    }
}
