//! Domain model for case templates.
//!
//! - [`template`]: the template, task and custom-field value shapes exchanged
//!   with the template store.
//! - [`reference`]: globally defined metric and custom-field definitions.
//! - [`field_order`]: the ordered custom-field name list used for reordering.
//! - [`tasks`]: the keyed task list that keeps task `order` contiguous.
//! - [`transfer`]: JSON export file naming and import whitelisting.

pub mod error;
pub mod field_order;
pub mod reference;
pub mod tasks;
pub mod template;
pub mod transfer;
pub mod types;

pub use error::CoreError;
pub use field_order::FieldOrder;
pub use reference::{CustomFieldDefinition, MetricDefinition, User};
pub use tasks::{KeyedTask, TaskList};
pub use template::{CaseTemplate, CustomFieldSlot, Severity, StoredTemplate, Task, Tlp};
pub use transfer::ExportedFile;
pub use types::{TaskKey, TemplateId};
