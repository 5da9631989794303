#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with key {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown custom field '{0}': not present in the custom field definitions")]
    UnknownCustomField(String),

    #[error("Invalid template file: {0}")]
    Parse(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
