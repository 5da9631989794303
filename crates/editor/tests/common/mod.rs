//! In-memory collaborators for driving the editor in tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use casetpl_core::{
    CaseTemplate, CustomFieldDefinition, ExportedFile, MetricDefinition, StoredTemplate, User,
};
use casetpl_editor::{
    CaseTemplateEditor, Collaborators, Confirmation, DialogHost, FileSaver, ImportRequest,
    Notifier, NotifyLevel, ReferenceCatalog, StoreError, TaskEditRequest, TaskEditResult,
    TemplateStore, UserDirectory,
};
use casetpl_events::EventBus;

// ---------------------------------------------------------------------------
// Template store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    List,
    Get(String),
    Create(serde_json::Value),
    Update(String, serde_json::Value),
    Delete(String),
}

#[derive(Default)]
pub struct MemoryStore {
    templates: Mutex<Vec<StoredTemplate>>,
    next_id: AtomicU64,
    calls: Mutex<Vec<StoreCall>>,
    fail_next: Mutex<Option<StoreError>>,
}

impl MemoryStore {
    pub fn with_templates(templates: Vec<CaseTemplate>) -> Self {
        let store = Self::default();
        *store.templates.lock().unwrap() = templates.into_iter().map(StoredTemplate::from).collect();
        store
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ids(&self) -> Vec<String> {
        self.templates
            .lock()
            .unwrap()
            .iter()
            .filter_map(|t| t.template.id.clone())
            .collect()
    }

    pub fn template(&self, id: &str) -> Option<CaseTemplate> {
        self.templates
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id() == Some(id))
            .map(|t| t.template.clone())
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: StoreError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    fn record(&self, call: StoreCall) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_next.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn not_found(id: &str) -> StoreError {
        StoreError::Api {
            status: 404,
            body: format!("caseTemplate {id} not found"),
        }
    }

    fn decode(body: &serde_json::Value, id: &str) -> Result<StoredTemplate, StoreError> {
        let mut template: CaseTemplate = serde_json::from_value(body.clone())
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        template.id = Some(id.to_string());
        Ok(StoredTemplate::from(template))
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn list(&self) -> Result<Vec<StoredTemplate>, StoreError> {
        self.record(StoreCall::List)?;
        Ok(self.templates.lock().unwrap().clone())
    }

    async fn get(&self, id: &str) -> Result<StoredTemplate, StoreError> {
        self.record(StoreCall::Get(id.to_string()))?;
        self.templates
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id() == Some(id))
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, body: &serde_json::Value) -> Result<String, StoreError> {
        self.record(StoreCall::Create(body.clone()))?;
        let id = format!("tpl-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let stored = Self::decode(body, &id)?;
        self.templates.lock().unwrap().push(stored);
        Ok(id)
    }

    async fn update(&self, id: &str, body: &serde_json::Value) -> Result<(), StoreError> {
        self.record(StoreCall::Update(id.to_string(), body.clone()))?;
        let stored = Self::decode(body, id)?;
        let mut templates = self.templates.lock().unwrap();
        let slot = templates
            .iter_mut()
            .find(|t| t.id() == Some(id))
            .ok_or_else(|| Self::not_found(id))?;
        *slot = stored;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.record(StoreCall::Delete(id.to_string()))?;
        let mut templates = self.templates.lock().unwrap();
        let before = templates.len();
        templates.retain(|t| t.id() != Some(id));
        if templates.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reference catalog and users
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct StaticCatalog {
    pub metrics: Vec<MetricDefinition>,
    pub fields: BTreeMap<String, CustomFieldDefinition>,
    pub users: Vec<User>,
}

#[async_trait]
impl ReferenceCatalog for StaticCatalog {
    async fn metrics(&self) -> Result<Vec<MetricDefinition>, StoreError> {
        Ok(self.metrics.clone())
    }

    async fn custom_fields(&self) -> Result<BTreeMap<String, CustomFieldDefinition>, StoreError> {
        Ok(self.fields.clone())
    }
}

#[async_trait]
impl UserDirectory for StaticCatalog {
    async fn active_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.clone())
    }
}

pub fn metric(name: &str) -> MetricDefinition {
    MetricDefinition {
        name: name.to_string(),
        title: name.to_string(),
        description: String::new(),
    }
}

pub fn field(reference: &str, name: &str, field_type: &str) -> CustomFieldDefinition {
    CustomFieldDefinition {
        reference: reference.to_string(),
        name: name.to_string(),
        description: String::new(),
        field_type: field_type.to_string(),
        options: Vec::new(),
    }
}

pub fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        name: id.to_uppercase(),
        status: Some("Ok".to_string()),
    }
}

// ---------------------------------------------------------------------------
// Dialogs
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ScriptedDialogs {
    task_results: Mutex<VecDeque<Option<TaskEditResult>>>,
    task_requests: Mutex<Vec<TaskEditRequest>>,
    import: Mutex<Option<ImportRequest>>,
    confirm: AtomicBool,
    confirmations: Mutex<Vec<Confirmation>>,
}

impl ScriptedDialogs {
    /// Queue the answer of the next task dialog (`None` = dismissed).
    pub fn answer_task(&self, result: Option<TaskEditResult>) {
        self.task_results.lock().unwrap().push_back(result);
    }

    pub fn task_requests(&self) -> Vec<TaskEditRequest> {
        self.task_requests.lock().unwrap().clone()
    }

    pub fn pick_file(&self, content: &str) {
        *self.import.lock().unwrap() = Some(ImportRequest {
            file_name: Some("template.json".to_string()),
            content: content.to_string(),
        });
    }

    pub fn answer_confirm(&self, yes: bool) {
        self.confirm.store(yes, Ordering::SeqCst);
    }

    pub fn confirmations(&self) -> Vec<Confirmation> {
        self.confirmations.lock().unwrap().clone()
    }
}

#[async_trait]
impl DialogHost for ScriptedDialogs {
    async fn edit_task(&self, request: TaskEditRequest) -> Option<TaskEditResult> {
        self.task_requests.lock().unwrap().push(request);
        self.task_results.lock().unwrap().pop_front().flatten()
    }

    async fn import_template(&self) -> Option<ImportRequest> {
        self.import.lock().unwrap().take()
    }

    async fn confirm(&self, confirmation: Confirmation) -> bool {
        self.confirmations.lock().unwrap().push(confirmation);
        self.confirm.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Notifier and files
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingNotifier {
    logs: Mutex<Vec<(String, NotifyLevel)>>,
    errors: Mutex<Vec<(String, StoreError)>>,
}

impl RecordingNotifier {
    pub fn logs(&self) -> Vec<(String, NotifyLevel)> {
        self.logs.lock().unwrap().clone()
    }

    pub fn at_level(&self, level: NotifyLevel) -> Vec<String> {
        self.logs()
            .into_iter()
            .filter(|(_, l)| *l == level)
            .map(|(m, _)| m)
            .collect()
    }

    pub fn errors(&self) -> Vec<(String, StoreError)> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn log(&self, message: &str, level: NotifyLevel) {
        self.logs.lock().unwrap().push((message.to_string(), level));
    }

    fn error(&self, context: &str, error: &StoreError) {
        self.errors
            .lock()
            .unwrap()
            .push((context.to_string(), error.clone()));
    }
}

#[derive(Default)]
pub struct MemoryFiles {
    saved: Mutex<Vec<ExportedFile>>,
}

impl MemoryFiles {
    pub fn saved(&self) -> Vec<ExportedFile> {
        self.saved.lock().unwrap().clone()
    }
}

impl FileSaver for MemoryFiles {
    fn save(&self, file: &ExportedFile) -> std::io::Result<()> {
        self.saved.lock().unwrap().push(file.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub catalog: Arc<StaticCatalog>,
    pub dialogs: Arc<ScriptedDialogs>,
    pub notifier: Arc<RecordingNotifier>,
    pub files: Arc<MemoryFiles>,
    pub events: Arc<EventBus>,
}

impl Harness {
    pub fn new(store: MemoryStore) -> Self {
        let mut fields = BTreeMap::new();
        for def in [
            field("impact", "Business impact", "string"),
            field("hits", "Hit count", "number"),
            field("confirmed", "Confirmed", "boolean"),
        ] {
            fields.insert(def.reference.clone(), def);
        }

        Self {
            store: Arc::new(store),
            catalog: Arc::new(StaticCatalog {
                metrics: vec![metric("Accuracy"), metric("Time to detect")],
                fields,
                users: vec![user("alice"), user("bob")],
            }),
            dialogs: Arc::new(ScriptedDialogs::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            files: Arc::new(MemoryFiles::default()),
            events: Arc::new(EventBus::default()),
        }
    }

    pub fn empty() -> Self {
        Self::new(MemoryStore::default())
    }

    pub fn editor(&self) -> CaseTemplateEditor {
        CaseTemplateEditor::new(Collaborators {
            store: self.store.clone(),
            catalog: self.catalog.clone(),
            users: self.catalog.clone(),
            dialogs: self.dialogs.clone(),
            notifier: self.notifier.clone(),
            files: self.files.clone(),
            events: self.events.clone(),
        })
    }

    /// An editor with reference data and the template list loaded.
    pub async fn loaded_editor(&self) -> CaseTemplateEditor {
        let mut editor = self.editor();
        editor.load().await;
        editor
    }
}

/// A persisted template with the given id and name.
pub fn template(id: &str, name: &str) -> CaseTemplate {
    CaseTemplate {
        id: Some(id.to_string()),
        name: name.to_string(),
        ..Default::default()
    }
}
