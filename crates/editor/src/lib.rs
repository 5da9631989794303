//! Case template editor.
//!
//! - [`ports`]: traits for the collaborators the editor drives (template
//!   store, reference catalog, user directory, dialogs, notifier, file saver)
//!   and the typed dialog messages.
//! - [`editor`]: [`CaseTemplateEditor`], the edit state and its operations.

pub mod editor;
pub mod error;
pub mod ports;

pub use editor::{CaseTemplateEditor, Collaborators, Tag, NOTIFY_CONTEXT};
pub use error::EditorError;
pub use ports::{
    Confirmation, DialogHost, FileSaver, Flavor, ImportRequest, Notifier, NotifyLevel,
    ReferenceCatalog, StoreError, TaskEditMode, TaskEditRequest, TaskEditResult, TemplateStore,
    UserDirectory,
};
