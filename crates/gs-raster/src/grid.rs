//! Grid geometry and the raster container.

use gs_core::BoundingBox;

use crate::{RasterError, RasterResult};

/// Metres per degree used by the default presets.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

// ── SpatialRef ────────────────────────────────────────────────────────────────

/// Coordinate reference system, identified by EPSG code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpatialRef {
    pub epsg:       u16,
    /// Geographic (lat/lon) rather than projected coordinates.
    pub geographic: bool,
}

impl SpatialRef {
    pub const WGS84: SpatialRef = SpatialRef { epsg: 4326, geographic: true };

    pub fn projected(epsg: u16) -> Self {
        Self { epsg, geographic: false }
    }
}

impl Default for SpatialRef {
    fn default() -> Self {
        Self::WGS84
    }
}

// ── GridSpec ──────────────────────────────────────────────────────────────────

/// How samples are binned into cells.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridSpec {
    /// Edge length of one square cell, in metres.
    pub cell_size_m:       f64,
    pub meters_per_degree: f64,
    /// Fill for cells that receive no sample.
    pub no_data:           f64,
    pub spatial_ref:       SpatialRef,
}

impl GridSpec {
    /// 56 m cells: sector, coverage, and switch-off maps.
    pub fn pixel_map() -> Self {
        Self {
            cell_size_m:       56.0,
            meters_per_degree: METERS_PER_DEGREE,
            no_data:           0.0,
            spatial_ref:       SpatialRef::WGS84,
        }
    }

    /// 315 m cells: competitive benchmark maps.
    pub fn competitive_map() -> Self {
        Self { cell_size_m: 315.0, ..Self::pixel_map() }
    }

    pub fn with_no_data(self, no_data: f64) -> Self {
        Self { no_data, ..self }
    }

    /// Cell edge in degrees.
    #[inline]
    pub fn resolution_degrees(&self) -> f64 {
        self.cell_size_m / self.meters_per_degree
    }

    pub(crate) fn validate(&self) -> RasterResult<()> {
        let res = self.resolution_degrees();
        if res.is_finite() && res > 0.0 && self.no_data.is_finite() {
            Ok(())
        } else {
            Err(RasterError::InvalidSpec(format!(
                "cell_size_m={} meters_per_degree={} no_data={}",
                self.cell_size_m, self.meters_per_degree, self.no_data
            )))
        }
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::pixel_map()
    }
}

// ── GeoTransform ──────────────────────────────────────────────────────────────

/// North-up affine transform: `x = origin_x + col·pixel_width`,
/// `y = origin_y - row·pixel_height`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoTransform {
    pub origin_x:     f64,
    pub origin_y:     f64,
    pub pixel_width:  f64,
    /// Positive; rows grow southward.
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Square cells anchored at the north-west corner.
    pub fn from_origin(west: f64, north: f64, res: f64) -> Self {
        Self { origin_x: west, origin_y: north, pixel_width: res, pixel_height: res }
    }

    /// Cell containing `(lon, lat)`, clamped into `cols × rows`.
    ///
    /// Points on the east or south edge land in the last column or row.
    pub fn cell_of(&self, lon: f64, lat: f64, cols: usize, rows: usize) -> (usize, usize) {
        let col = ((lon - self.origin_x) / self.pixel_width).floor().max(0.0) as usize;
        let row = ((self.origin_y - lat) / self.pixel_height).floor().max(0.0) as usize;
        (col.min(cols.saturating_sub(1)), row.min(rows.saturating_sub(1)))
    }

    pub fn bounds(&self, cols: usize, rows: usize) -> BoundingBox {
        BoundingBox {
            xmin: self.origin_x,
            ymin: self.origin_y - rows as f64 * self.pixel_height,
            xmax: self.origin_x + cols as f64 * self.pixel_width,
            ymax: self.origin_y,
        }
    }
}

// ── RasterGrid ────────────────────────────────────────────────────────────────

/// Single-band `f32` raster, row-major, row 0 at the north edge.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterGrid {
    pub cols:        usize,
    pub rows:        usize,
    pub cells:       Vec<f32>,
    pub transform:   GeoTransform,
    pub spatial_ref: SpatialRef,
    pub no_data:     f64,
}

impl RasterGrid {
    /// A grid with every cell set to `no_data`.
    pub fn filled(cols: usize, rows: usize, transform: GeoTransform, spatial_ref: SpatialRef, no_data: f64) -> Self {
        Self {
            cols,
            rows,
            cells: vec![no_data as f32; cols * rows],
            transform,
            spatial_ref,
            no_data,
        }
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col])
    }

    #[inline]
    pub fn set(&mut self, col: usize, row: usize, value: f32) {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = value;
        }
    }

    /// NaN or equal to the no-data sentinel at `f32` precision.
    #[inline]
    pub fn is_no_data(&self, value: f32) -> bool {
        value.is_nan() || value == self.no_data as f32
    }

    pub fn bounds(&self) -> BoundingBox {
        self.transform.bounds(self.cols, self.rows)
    }

    /// Number of cells holding a value.
    pub fn valid_count(&self) -> usize {
        self.cells.iter().filter(|&&v| !self.is_no_data(v)).count()
    }
}
