//! Error types for gs-repo.

use gs_core::{CoreError, KpiKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The KPI exists only in the per-pixel aggregate, not per sector.
    #[error("KPI {0} is not available per sector")]
    NotPerSector(KpiKind),

    #[error("measurement parse error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl RepoError {
    /// Whether repeating the same call may succeed: I/O failures and a busy,
    /// locked, or unopenable database.  Bad data and bad selections never are.
    pub fn is_retryable(&self) -> bool {
        match self {
            RepoError::Io(_) => true,
            #[cfg(feature = "sqlite")]
            RepoError::Sqlite(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy
                    | rusqlite::ErrorCode::DatabaseLocked
                    | rusqlite::ErrorCode::CannotOpen
            ),
            _ => false,
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;
