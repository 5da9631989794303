use casetpl_core::CoreError;

use crate::ports::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Template store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to save export file: {0}")]
    Io(#[from] std::io::Error),
}
