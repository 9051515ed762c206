//! Value raster → RGB / RGBA pixels.

use gs_core::{BoundingBox, ColorScaleId, VisualProfile};
use gs_raster::{GeoTransform, RasterGrid, SpatialRef};

use crate::{build_legend, check_range, ColorLegend, ColorScale, RenderResult};

/// Legend size used when a caller does not choose one.
pub const DEFAULT_LEGEND_ENTRIES: usize = 6;

/// Parameters of one colorization.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorizeOptions {
    pub vmin:           f64,
    pub vmax:           f64,
    pub scale:          ColorScale,
    /// Cells equal to this value (at `f32` precision) are transparent, in
    /// addition to the raster's own sentinel.
    pub no_data:        f64,
    pub legend_entries: usize,
}

impl ColorizeOptions {
    pub fn new(vmin: f64, vmax: f64, scale: ColorScaleId) -> Self {
        Self {
            vmin,
            vmax,
            scale: ColorScale::new(scale),
            no_data: 0.0,
            legend_entries: DEFAULT_LEGEND_ENTRIES,
        }
    }

    /// Range, scale and no-data of a KPI's visual profile.
    pub fn from_profile(profile: &VisualProfile) -> Self {
        Self { no_data: profile.no_data, ..Self::new(profile.vmin, profile.vmax, profile.scale) }
    }

    pub fn with_legend_entries(self, n: usize) -> Self {
        Self { legend_entries: n, ..self }
    }
}

/// Output of [`colorize`]: interleaved 8-bit pixels plus the legend and the
/// georeferencing of the source grid.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorizedRaster {
    /// `cols · rows · 3` bytes; undefined cells are black.
    pub rgb:         Vec<u8>,
    /// `cols · rows · 4` bytes; undefined cells are fully transparent.
    pub rgba:        Vec<u8>,
    pub cols:        usize,
    pub rows:        usize,
    pub legend:      ColorLegend,
    pub bounds:      BoundingBox,
    pub transform:   GeoTransform,
    pub spatial_ref: SpatialRef,
}

impl ColorizedRaster {
    /// RGBA of the cell at `(col, row)`.
    pub fn rgba_at(&self, col: usize, row: usize) -> Option<[u8; 4]> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        let i = (row * self.cols + col) * 4;
        Some([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]])
    }

    /// Number of opaque cells.
    pub fn opaque_count(&self) -> usize {
        self.rgba.chunks_exact(4).filter(|px| px[3] == u8::MAX).count()
    }
}

/// Color every cell of `grid`.
///
/// The range is validated before any pixel is touched; the output is a pure
/// function of `grid` and `opts`.
pub fn colorize(grid: &RasterGrid, opts: &ColorizeOptions) -> RenderResult<ColorizedRaster> {
    let range = check_range(opts.vmin, opts.vmax)?;
    let span = range.max - range.min;
    let extra_no_data = opts.no_data as f32;

    let n = grid.cells.len();
    let mut rgb = Vec::with_capacity(n * 3);
    let mut rgba = Vec::with_capacity(n * 4);

    for &cell in &grid.cells {
        if grid.is_no_data(cell) || cell == extra_no_data {
            rgb.extend_from_slice(&[0, 0, 0]);
            rgba.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        let t = (f64::from(cell).clamp(range.min, range.max) - range.min) / span;
        let [r, g, b] = opts.scale.at(t);
        rgb.extend_from_slice(&[r, g, b]);
        rgba.extend_from_slice(&[r, g, b, u8::MAX]);
    }

    let legend = build_legend(opts.scale, range.min, range.max, opts.legend_entries)?;

    tracing::debug!(
        cols = grid.cols,
        rows = grid.rows,
        scale = %opts.scale.id(),
        "colorized raster"
    );

    Ok(ColorizedRaster {
        rgb,
        rgba,
        cols: grid.cols,
        rows: grid.rows,
        legend,
        bounds: grid.bounds(),
        transform: grid.transform,
        spatial_ref: grid.spatial_ref,
    })
}
