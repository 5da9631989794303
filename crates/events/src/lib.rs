//! Case template change notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`TemplateEvent`]: the "templates changed" message sibling views
//!   subscribe to (for example a case-creation form listing templates).

pub mod bus;

pub use bus::{EventBus, TemplateChange, TemplateEvent};
