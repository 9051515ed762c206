//! Error types for gs-raster.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    /// Too few valid samples, or samples that span no area.
    #[error("degenerate raster input: {0}")]
    DegenerateInput(String),

    #[error("invalid grid spec: {0}")]
    InvalidSpec(String),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// A TIFF that decodes but is not the GeoTIFF layout this crate writes.
    #[error("unsupported GeoTIFF: {0}")]
    Format(String),
}

pub type RasterResult<T> = Result<T, RasterError>;
