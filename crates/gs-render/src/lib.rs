//! `gs-render` — from a value raster to something a map can show.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`scale`]     | `ColorScale` (anchor tables + linear interpolation)        |
//! | [`colorize`]  | `ColorizeOptions`, `ColorizedRaster`, `colorize`           |
//! | [`legend`]    | `ColorLegend`, `LegendEntry`, `LegendCache`                |
//! | [`encode`]    | `encode_rgb_geotiff`, `encode_rgba_geotiff`                |
//! | [`error`]     | `RenderError`, `RenderResult<T>`                           |
//!
//! # Pixel rule
//!
//! ```text
//! cell is NaN or no-data      → RGBA (0,0,0,0), RGB (0,0,0)
//! otherwise                   → t = (clip(v, vmin, vmax) - vmin) / (vmax - vmin)
//!                               RGB = scale(t), A = 255
//! ```
//!
//! # Feature flags
//!
//! | Flag    | Effect                                        |
//! |---------|-----------------------------------------------|
//! | `serde` | `Serialize` on `ColorLegend` / `LegendEntry`. |

pub mod colorize;
pub mod encode;
pub mod error;
pub mod legend;
pub mod scale;

#[cfg(test)]
mod tests;

pub use colorize::{colorize, ColorizeOptions, ColorizedRaster, DEFAULT_LEGEND_ENTRIES};
pub use encode::{encode_rgb_geotiff, encode_rgba_geotiff};
pub use error::{RenderError, RenderResult};
pub use legend::{build_legend, legend_for_scale_name, ColorLegend, LegendCache, LegendEntry};
pub use scale::ColorScale;

use gs_core::ValueRange;

/// Reject reversed, empty, or non-finite ranges before any pixel work.
pub(crate) fn check_range(vmin: f64, vmax: f64) -> RenderResult<ValueRange> {
    if vmin.is_finite() && vmax.is_finite() && vmin < vmax {
        Ok(ValueRange { min: vmin, max: vmax })
    } else {
        Err(RenderError::InvalidRange { vmin, vmax })
    }
}
