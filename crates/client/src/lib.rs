//! HTTP client for the case template REST API.
//!
//! [`TemplateApi`] implements the editor's remote ports
//! ([`casetpl_editor::TemplateStore`], [`casetpl_editor::ReferenceCatalog`],
//! [`casetpl_editor::UserDirectory`]) over `reqwest`.

pub mod api;
pub mod config;

pub use api::{ClientError, TemplateApi};
pub use config::{ClientConfig, ConfigError};
