//! Error types for gs-render.

use gs_core::CoreError;
use gs_raster::RasterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Unknown color-scale name, among others.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// `vmin >= vmax`, or either bound is not finite.
    #[error("invalid color range [{vmin}, {vmax}]")]
    InvalidRange { vmin: f64, vmax: f64 },

    #[error(transparent)]
    Raster(#[from] RasterError),
}

pub type RenderResult<T> = Result<T, RenderError>;
