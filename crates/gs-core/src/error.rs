//! Workspace base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, so a bad KPI name raised here surfaces unchanged
//! through the pipeline.

use thiserror::Error;

/// The error type for `gs-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An identifier (KPI column, dashboard tab, color scale, …) that is not
    /// part of the closed set this workspace understands.
    #[error("invalid {what} selection: {value:?}")]
    InvalidSelection { what: &'static str, value: String },

    /// A `[min, max]` filter whose bounds are reversed or not finite.
    #[error("invalid range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },
}

impl CoreError {
    pub(crate) fn selection(what: &'static str, value: &str) -> Self {
        CoreError::InvalidSelection { what, value: value.to_owned() }
    }
}

/// Shorthand result type for `gs-core`.
pub type CoreResult<T> = Result<T, CoreError>;
