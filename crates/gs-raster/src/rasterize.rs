//! Point samples to grid cells.

use gs_core::{BoundingBox, GeoSample};

use crate::grid::{GeoTransform, GridSpec, RasterGrid};
use crate::{RasterError, RasterResult};

/// Round to two decimals, half away from zero.
#[inline]
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Burn `samples` into a new grid described by `spec`.
///
/// Samples without a finite value are dropped first.  The grid extent is
/// the bounding box of what remains; each sample writes its rounded value
/// into the cell containing it, later samples overwriting earlier ones.
///
/// Fails with [`RasterError::DegenerateInput`] when fewer than two samples
/// remain or they span zero width or height.
pub fn rasterize(samples: &[GeoSample], spec: &GridSpec) -> RasterResult<RasterGrid> {
    spec.validate()?;

    let valid: Vec<(f64, f64, f64)> = samples
        .iter()
        .filter_map(|s| s.value.filter(|v| v.is_finite()).map(|v| (s.lon, s.lat, round2(v))))
        .filter(|(lon, lat, _)| lon.is_finite() && lat.is_finite())
        .collect();

    if valid.len() <= 1 {
        return Err(RasterError::DegenerateInput(format!(
            "{} valid sample(s) out of {}",
            valid.len(),
            samples.len()
        )));
    }

    let bbox = BoundingBox::from_points(valid.iter().map(|&(lon, lat, _)| (lon, lat)))
        .ok_or_else(|| RasterError::DegenerateInput("no samples".to_owned()))?;
    if bbox.is_degenerate() {
        return Err(RasterError::DegenerateInput(format!(
            "zero-area extent {:.6}x{:.6} deg",
            bbox.width(),
            bbox.height()
        )));
    }

    let res = spec.resolution_degrees();
    let cols = (bbox.width() / res).ceil() as usize;
    let rows = (bbox.height() / res).ceil() as usize;
    let transform = GeoTransform::from_origin(bbox.xmin, bbox.ymax, res);

    let mut grid = RasterGrid::filled(cols, rows, transform, spec.spatial_ref, spec.no_data);
    for &(lon, lat, value) in &valid {
        let (col, row) = transform.cell_of(lon, lat, cols, rows);
        grid.set(col, row, value as f32);
    }

    tracing::debug!(
        samples = samples.len(),
        valid = valid.len(),
        cols,
        rows,
        res,
        "rasterized"
    );
    Ok(grid)
}
