//! `gs-raster` — irregular KPI samples to a georeferenced grid.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`grid`]       | `GridSpec`, `GeoTransform`, `SpatialRef`, `RasterGrid`    |
//! | [`rasterize`]  | `rasterize(samples, spec)`                                |
//! | [`geotiff`]    | single-band `f32` and 8-bit RGB/RGBA GeoTIFF codec        |
//! | [`center`]     | `density_center` (outlier-trimmed map centre)             |
//! | [`error`]      | `RasterError`, `RasterResult<T>`                          |
//!
//! # Grid model
//!
//! ```text
//! res  = cell_size_m / meters_per_degree         (degrees, both axes)
//! cols = ceil((xmax - xmin) / res)
//! rows = ceil((ymax - ymin) / res)
//! origin = (xmin, ymax), row index grows southward
//! ```
//!
//! Converting metres to degrees with a single constant is an equirectangular
//! approximation: cells get narrower east-west as latitude grows.  The
//! constant is a [`GridSpec`] field rather than a hidden literal.

pub mod center;
pub mod error;
pub mod geotiff;
pub mod grid;
pub mod rasterize;


pub use center::density_center;
pub use error::{RasterError, RasterResult};
pub use geotiff::{read_geotiff, write_geotiff, write_rgb8_geotiff, write_rgba8_geotiff};
pub use grid::{GeoTransform, GridSpec, RasterGrid, SpatialRef, METERS_PER_DEGREE};
pub use rasterize::rasterize;
