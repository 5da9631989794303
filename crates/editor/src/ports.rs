//! Collaborators the editor talks to.
//!
//! Everything the editor does not own (the remote store, reference lists,
//! dialogs, notifications, file output) sits behind one of these traits so
//! the editor can be driven by an HTTP client and a terminal, or by
//! in-memory fakes in tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use casetpl_core::{
    CustomFieldDefinition, ExportedFile, MetricDefinition, StoredTemplate, Task, TaskKey,
    TemplateId, User,
};
use serde::Serialize;

/* --------------------------------------------------------------------------
   Store errors
   -------------------------------------------------------------------------- */

/// Failure reported by a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response (network, DNS, TLS...).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The store answered with a non-2xx status.
    #[error("Store returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl StoreError {
    /// HTTP status of the failed call, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/* --------------------------------------------------------------------------
   Remote collaborators
   -------------------------------------------------------------------------- */

/// Remote CRUD over case templates.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn list(&self) -> Result<Vec<StoredTemplate>, StoreError>;

    async fn get(&self, id: &str) -> Result<StoredTemplate, StoreError>;

    /// Create a template from an id-less body; returns the assigned id.
    async fn create(&self, body: &serde_json::Value) -> Result<TemplateId, StoreError>;

    async fn update(&self, id: &str, body: &serde_json::Value) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Read-only lists of globally defined metrics and custom fields.
#[async_trait]
pub trait ReferenceCatalog: Send + Sync {
    async fn metrics(&self) -> Result<Vec<MetricDefinition>, StoreError>;

    /// Custom field definitions keyed by reference.
    async fn custom_fields(&self) -> Result<BTreeMap<String, CustomFieldDefinition>, StoreError>;
}

/// Users that tasks may be assigned to.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn active_users(&self) -> Result<Vec<User>, StoreError>;
}

/* --------------------------------------------------------------------------
   Dialogs
   -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskEditMode {
    Add,
    Update,
}

/// Opens the task sub-form.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEditRequest {
    pub mode: TaskEditMode,
    /// Set for [`TaskEditMode::Update`].
    pub key: Option<TaskKey>,
    /// A copy of the task; for adds only `order` is filled in.
    pub task: Task,
    /// Candidate assignees.
    pub users: Vec<User>,
}

/// The task as confirmed by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEditResult {
    pub task: Task,
}

/// Content of the file picked in the import dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub file_name: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    Primary,
    Danger,
}

/// A yes/no question put to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub title: String,
    pub message: String,
    pub ok_text: String,
    pub flavor: Flavor,
}

/// Modal sub-forms. `None`/`false` means the user dismissed the dialog.
#[async_trait]
pub trait DialogHost: Send + Sync {
    async fn edit_task(&self, request: TaskEditRequest) -> Option<TaskEditResult>;

    async fn import_template(&self) -> Option<ImportRequest>;

    async fn confirm(&self, confirmation: Confirmation) -> bool;
}

/* --------------------------------------------------------------------------
   Notifications and files
   -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// User-facing messages.
pub trait Notifier: Send + Sync {
    fn log(&self, message: &str, level: NotifyLevel);

    /// Report a failed store call, tagged with the view it came from.
    fn error(&self, context: &str, error: &StoreError);
}

/// Client-side file output for exports.
pub trait FileSaver: Send + Sync {
    fn save(&self, file: &ExportedFile) -> std::io::Result<()>;
}
