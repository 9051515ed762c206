//! Error types for gs-store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The temp file could not be renamed into place.
    #[error("persist error: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("artifact not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
