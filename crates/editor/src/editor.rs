//! The case template editor.
//!
//! [`CaseTemplateEditor`] owns the edit state of one template at a time
//! (form fields, tag chips, keyed task list, ordered custom-field names)
//! plus the template list and the reference catalogs. Every operation takes
//! `&mut self`, so one editor never runs two operations concurrently.
//!
//! Background loads (`load`, `refresh_list`, `select_template`) only log
//! failures through `tracing` and leave the state untouched. Operations the
//! user triggers explicitly (save, delete, import, export, task dialogs)
//! report failures through the [`Notifier`] and return them.

use std::collections::BTreeMap;
use std::sync::Arc;

use casetpl_core::transfer;
use casetpl_core::{
    CaseTemplate, CoreError, CustomFieldDefinition, CustomFieldSlot, ExportedFile, FieldOrder,
    MetricDefinition, Severity, StoredTemplate, Task, TaskKey, TaskList, TemplateId, Tlp, User,
};
use casetpl_events::{EventBus, TemplateChange, TemplateEvent};

use crate::error::EditorError;
use crate::ports::{
    Confirmation, DialogHost, FileSaver, Flavor, Notifier, NotifyLevel, ReferenceCatalog,
    StoreError, TaskEditMode, TaskEditRequest, TemplateStore, UserDirectory,
};

/// Context attached to store failures reported by the editor.
pub const NOTIFY_CONTEXT: &str = "TemplateCtrl";

const DELETE_TITLE: &str = "Remove case template";
const DELETE_MESSAGE: &str = "Are you sure you want to delete this case template?";
const DELETE_OK_TEXT: &str = "Yes, remove it";

/// A tag as edited in the tag input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub text: String,
}

/// Everything the editor depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn TemplateStore>,
    pub catalog: Arc<dyn ReferenceCatalog>,
    pub users: Arc<dyn UserDirectory>,
    pub dialogs: Arc<dyn DialogHost>,
    pub notifier: Arc<dyn Notifier>,
    pub files: Arc<dyn FileSaver>,
    pub events: Arc<EventBus>,
}

pub struct CaseTemplateEditor {
    ports: Collaborators,
    templates: Vec<StoredTemplate>,
    template: CaseTemplate,
    tags: Vec<Tag>,
    tasks: TaskList,
    fields: FieldOrder,
    selected: Option<usize>,
    metric_catalog: Vec<MetricDefinition>,
    field_catalog: BTreeMap<String, CustomFieldDefinition>,
}

impl CaseTemplateEditor {
    /// An editor holding a blank template. Call [`load`](Self::load) to
    /// populate it from the store.
    pub fn new(ports: Collaborators) -> Self {
        Self {
            ports,
            templates: Vec::new(),
            template: CaseTemplate::blank(),
            tags: Vec::new(),
            tasks: TaskList::default(),
            fields: FieldOrder::default(),
            selected: None,
            metric_catalog: Vec::new(),
            field_catalog: BTreeMap::new(),
        }
    }

    // ---- accessors ----

    /// The template list as last fetched from the store.
    pub fn templates(&self) -> &[StoredTemplate] {
        &self.templates
    }

    /// Scalar fields of the template being edited.
    ///
    /// Tags, tasks and custom fields live in [`tags`](Self::tags),
    /// [`tasks`](Self::tasks) and [`custom_fields`](Self::custom_fields)
    /// until the next save.
    pub fn template(&self) -> &CaseTemplate {
        &self.template
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn custom_fields(&self) -> &FieldOrder {
        &self.fields
    }

    /// Position of the edited template in [`templates`](Self::templates);
    /// `None` for a new template.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn metric_catalog(&self) -> &[MetricDefinition] {
        &self.metric_catalog
    }

    pub fn field_catalog(&self) -> &BTreeMap<String, CustomFieldDefinition> {
        &self.field_catalog
    }

    /// Names of the metrics attached to the template.
    pub fn metric_names(&self) -> Vec<&str> {
        self.template.metrics.keys().map(String::as_str).collect()
    }

    // ---- loading and selection ----

    /// Fetch the reference catalogs and the template list, then select the
    /// first template (or start a blank one).
    pub async fn load(&mut self) {
        self.load_reference_data().await;
        self.refresh_list(None).await;
    }

    pub async fn load_reference_data(&mut self) {
        match self.ports.catalog.metrics().await {
            Ok(metrics) => {
                tracing::debug!(count = metrics.len(), "Loaded metric definitions");
                self.metric_catalog = metrics;
            }
            Err(e) => tracing::warn!(error = %e, "Failed to load metric definitions"),
        }

        match self.ports.catalog.custom_fields().await {
            Ok(fields) => {
                tracing::debug!(count = fields.len(), "Loaded custom field definitions");
                self.field_catalog = fields;
            }
            Err(e) => tracing::warn!(error = %e, "Failed to load custom field definitions"),
        }
    }

    /// Re-fetch the template list and select `focus`, or the first template.
    ///
    /// An empty list starts a blank template.
    pub async fn refresh_list(&mut self, focus: Option<&str>) {
        let templates = match self.ports.store.list().await {
            Ok(templates) => templates,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list case templates");
                return;
            }
        };
        tracing::debug!(count = templates.len(), "Loaded case templates");
        self.templates = templates;

        if self.templates.is_empty() {
            self.new_template();
            return;
        }

        let target = match focus {
            Some(id) => Some(id.to_string()),
            None => self.templates[0].id().map(str::to_string),
        };
        match target {
            Some(id) => self.select_template(&id).await,
            None => {
                tracing::warn!("First case template has no id; starting a blank template");
                self.new_template();
            }
        }
    }

    /// Fetch one template and make it the edited template.
    pub async fn select_template(&mut self, id: &str) {
        match self.ports.store.get(id).await {
            Ok(stored) => self.apply(stored),
            Err(e) => tracing::warn!(template_id = %id, error = %e, "Failed to load case template"),
        }
    }

    /// Start editing a blank, unsaved template.
    pub fn new_template(&mut self) {
        self.template = CaseTemplate::blank();
        self.tags.clear();
        self.tasks = TaskList::default();
        self.fields = FieldOrder::default();
        self.selected = None;
    }

    fn apply(&mut self, stored: StoredTemplate) {
        let template = stored.into_template();
        self.tags = template
            .tags
            .iter()
            .map(|text| Tag { text: text.clone() })
            .collect();
        self.fields = FieldOrder::from_custom_fields(&template.custom_fields);
        self.tasks = TaskList::from_tasks(template.tasks.clone());
        self.selected = template
            .id
            .as_deref()
            .and_then(|id| self.templates.iter().position(|t| t.id() == Some(id)));
        tracing::debug!(
            template_id = ?template.id,
            tasks = self.tasks.len(),
            custom_fields = self.fields.len(),
            "Selected case template"
        );
        self.template = template;
    }

    // ---- form setters ----

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.template.name = name.into();
    }

    pub fn set_title_prefix(&mut self, prefix: impl Into<String>) {
        self.template.title_prefix = prefix.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.template.description = description.into();
    }

    pub fn set_severity(&mut self, severity: Severity) {
        self.template.severity = severity;
    }

    pub fn set_tlp(&mut self, tlp: Tlp) {
        self.template.tlp = tlp;
    }

    /// Add a tag chip. Blank and duplicate tags are ignored.
    pub fn add_tag(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.tags.iter().any(|t| t.text == text) {
            return false;
        }
        self.tags.push(Tag {
            text: text.to_string(),
        });
        true
    }

    pub fn remove_tag(&mut self, text: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t.text != text);
        self.tags.len() != before
    }

    // ---- metrics ----

    /// Attach a metric with no value. Re-adding resets the value to null.
    pub fn add_metric(&mut self, metric: &MetricDefinition) {
        self.template.metrics.insert(metric.name.clone(), None);
    }

    pub fn remove_metric(&mut self, name: &str) -> bool {
        self.template.metrics.remove(name).is_some()
    }

    // ---- custom fields ----

    /// Append a custom field by reference.
    ///
    /// A field already on the template is not added again; the user gets a
    /// warning instead.
    pub fn add_custom_field(&mut self, field: &CustomFieldDefinition) -> bool {
        if self.fields.add(field.reference.as_str()) {
            return true;
        }
        self.ports.notifier.log(
            &format!(
                "The custom field [{}] has already been added to the template",
                field.name
            ),
            NotifyLevel::Warning,
        );
        false
    }

    pub fn remove_custom_field(&mut self, name: &str) -> bool {
        self.fields.remove(name)
    }

    /// Drag-and-drop move within the ordered custom-field list.
    pub fn move_custom_field(&mut self, from: usize, to: usize) -> Result<(), EditorError> {
        Ok(self.fields.move_field(from, to)?)
    }

    // ---- tasks ----

    /// Rewrite every task's `order` as its position.
    pub fn reorder_tasks(&mut self) {
        self.tasks.reorder();
    }

    /// Drag-and-drop move within the task list.
    pub fn move_task(&mut self, from: usize, to: usize) -> Result<(), EditorError> {
        Ok(self.tasks.move_task(from, to)?)
    }

    pub fn remove_task(&mut self, key: TaskKey) -> Option<Task> {
        self.tasks.remove(key)
    }

    /// Open the task dialog in add mode and append the confirmed task.
    ///
    /// Returns the key of the new task, or `None` if the dialog was dismissed.
    pub async fn add_task(&mut self) -> Result<Option<TaskKey>, EditorError> {
        let users = self.assignable_users().await?;
        let request = TaskEditRequest {
            mode: TaskEditMode::Add,
            key: None,
            task: Task {
                order: self.tasks.next_order(),
                ..Default::default()
            },
            users,
        };

        let Some(result) = self.ports.dialogs.edit_task(request).await else {
            return Ok(None);
        };
        Ok(Some(self.tasks.push(result.task)))
    }

    /// Open the task dialog on an existing task and replace it on confirm.
    ///
    /// Returns `false` if the dialog was dismissed.
    pub async fn edit_task(&mut self, key: TaskKey) -> Result<bool, EditorError> {
        let task = self
            .tasks
            .get(key)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "task",
                key: key.to_string(),
            })?;
        let users = self.assignable_users().await?;
        let request = TaskEditRequest {
            mode: TaskEditMode::Update,
            key: Some(key),
            task,
            users,
        };

        let Some(result) = self.ports.dialogs.edit_task(request).await else {
            return Ok(false);
        };
        self.tasks.replace(key, result.task)?;
        Ok(true)
    }

    async fn assignable_users(&self) -> Result<Vec<User>, EditorError> {
        self.ports
            .users
            .active_users()
            .await
            .map_err(|e| self.report(e))
    }

    // ---- persistence ----

    /// The edited template in its persisted shape: tag chips flattened,
    /// tasks in list order, custom fields re-projected from the ordered list.
    pub fn snapshot(&self) -> Result<CaseTemplate, CoreError> {
        let custom_fields = self.fields.project(&self.field_catalog)?;
        Ok(self.with_edits(custom_fields))
    }

    /// The edited template as loaded plus pending edits, for export and
    /// display.
    ///
    /// Unlike [`snapshot`](Self::snapshot), custom fields keep their stored
    /// type and value; the catalog is only consulted for fields added since
    /// the template was loaded.
    pub fn working_copy(&self) -> Result<CaseTemplate, CoreError> {
        let custom_fields = self
            .fields
            .arrange(&self.template.custom_fields, &self.field_catalog)?;
        Ok(self.with_edits(custom_fields))
    }

    fn with_edits(&self, custom_fields: BTreeMap<String, CustomFieldSlot>) -> CaseTemplate {
        let mut template = self.template.clone();
        template.tags = self.tags.iter().map(|t| t.text.clone()).collect();
        template.tasks = self.tasks.to_tasks();
        template.custom_fields = custom_fields;
        template
    }

    /// Create the template if it has no id, update it otherwise.
    pub async fn save_template(&mut self) -> Result<TemplateId, EditorError> {
        let template = self.snapshot().map_err(|e| self.fail(e))?;
        self.template = template.clone();

        match template.id.as_deref().filter(|id| !id.is_empty()) {
            None => self.create_template(&template).await,
            Some(id) => {
                let id = id.to_string();
                self.update_template(&id, &template).await
            }
        }
    }

    async fn create_template(&mut self, template: &CaseTemplate) -> Result<TemplateId, EditorError> {
        let body = template.to_body().map_err(|e| self.fail(e))?;
        let id = self
            .ports
            .store
            .create(&body)
            .await
            .map_err(|e| self.report(e))?;
        tracing::info!(template_id = %id, name = %template.name, "Case template created");

        self.refresh_list(Some(&id)).await;
        self.publish(TemplateChange::Created, &id, &template.name);
        self.ports.notifier.log(
            &format!(
                "The template [{}] has been successfully created",
                template.name
            ),
            NotifyLevel::Success,
        );
        Ok(id)
    }

    async fn update_template(
        &mut self,
        id: &str,
        template: &CaseTemplate,
    ) -> Result<TemplateId, EditorError> {
        let body = template.to_body().map_err(|e| self.fail(e))?;
        self.ports
            .store
            .update(id, &body)
            .await
            .map_err(|e| self.report(e))?;
        tracing::info!(template_id = %id, name = %template.name, "Case template updated");

        self.refresh_list(Some(id)).await;
        self.publish(TemplateChange::Updated, id, &template.name);
        self.ports.notifier.log(
            &format!(
                "The template [{}] has been successfully updated",
                template.name
            ),
            NotifyLevel::Success,
        );
        Ok(id.to_string())
    }

    /// Delete the edited template after the user confirms.
    ///
    /// Returns `false` when there is nothing to delete or the user cancelled.
    pub async fn delete_template(&mut self) -> Result<bool, EditorError> {
        let Some(id) = self.template.id.clone().filter(|id| !id.is_empty()) else {
            tracing::debug!("Ignoring delete of an unsaved template");
            return Ok(false);
        };

        let confirmed = self
            .ports
            .dialogs
            .confirm(Confirmation {
                title: DELETE_TITLE.to_string(),
                message: DELETE_MESSAGE.to_string(),
                ok_text: DELETE_OK_TEXT.to_string(),
                flavor: Flavor::Danger,
            })
            .await;
        if !confirmed {
            return Ok(false);
        }

        self.ports
            .store
            .delete(&id)
            .await
            .map_err(|e| self.report(e))?;
        tracing::info!(template_id = %id, "Case template deleted");

        let name = self.template.name.clone();
        self.refresh_list(None).await;
        self.publish(TemplateChange::Deleted, &id, &name);
        Ok(true)
    }

    // ---- export / import ----

    /// Write the edited template (without id) to a JSON file.
    pub fn export_template(&self) -> Result<ExportedFile, EditorError> {
        let file = self
            .working_copy()
            .and_then(|template| transfer::export_template(&template))
            .map_err(|e| self.fail(e))?;
        self.ports.files.save(&file).map_err(|e| self.fail(e))?;
        tracing::info!(file_name = %file.file_name, "Case template exported");
        Ok(file)
    }

    /// Create a new template from a file picked in the import dialog.
    ///
    /// Returns the new id, or `None` if the dialog was dismissed.
    pub async fn import_template(&mut self) -> Result<Option<TemplateId>, EditorError> {
        let Some(request) = self.ports.dialogs.import_template().await else {
            return Ok(None);
        };

        let template = transfer::parse_import(&request.content).map_err(|e| self.fail(e))?;
        tracing::info!(
            file_name = request.file_name.as_deref().unwrap_or("<unnamed>"),
            name = %template.name,
            "Importing case template"
        );

        let body = template.to_body().map_err(|e| self.fail(e))?;
        let id = self
            .ports
            .store
            .create(&body)
            .await
            .map_err(|e| self.report(e))?;

        self.refresh_list(Some(&id)).await;
        self.publish(TemplateChange::Imported, &id, &template.name);
        self.ports.notifier.log(
            "The template has been successfully imported",
            NotifyLevel::Success,
        );
        Ok(Some(id))
    }

    // ---- private helpers ----

    fn publish(&self, change: TemplateChange, id: &str, name: &str) {
        self.ports
            .events
            .publish(TemplateEvent::new(change, id).with_name(name));
    }

    /// Forward a store failure to the notifier.
    fn report(&self, error: StoreError) -> EditorError {
        tracing::error!(error = %error, status = ?error.status(), "Case template store call failed");
        self.ports.notifier.error(NOTIFY_CONTEXT, &error);
        EditorError::Store(error)
    }

    /// Surface a local failure (invalid file, unknown field, I/O) to the user.
    fn fail(&self, error: impl Into<EditorError>) -> EditorError {
        let error = error.into();
        tracing::warn!(error = %error, "Case template operation failed");
        self.ports
            .notifier
            .log(&error.to_string(), NotifyLevel::Error);
        error
    }
}
