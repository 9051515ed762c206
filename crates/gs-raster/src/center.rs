//! Map-centre estimation.

use gs_core::GeoPoint;

/// Linear-interpolated quantile of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Trimmed extent of the finite entries of `values`, snapped to samples:
/// the largest value `<= q(trim)` and the smallest value `> q(1 - trim)`.
/// When no value exceeds the upper quantile the maximum is used.
fn trimmed_extent(mut values: Vec<f64>, trim: f64) -> Option<(f64, f64)> {
    values.retain(|v| v.is_finite());
    values.sort_by(f64::total_cmp);
    let last = *values.last()?;

    let q_lo = quantile(&values, trim);
    let q_hi = quantile(&values, 1.0 - trim);
    let lo = values.partition_point(|&v| v <= q_lo).checked_sub(1).map_or(values[0], |i| values[i]);
    let hi = values.get(values.partition_point(|&v| v <= q_hi)).copied().unwrap_or(last);
    Some((lo, hi))
}

/// Centre of the densest part of a point cloud.
///
/// Each axis is trimmed independently by `trim` (e.g. `0.02` drops the
/// outer 2 % at each end) and the centre is the midpoint of the snapped
/// extent.
/// Returns `None` for an empty input.
pub fn density_center<I>(points: I, trim: f64) -> Option<GeoPoint>
where
    I: IntoIterator<Item = GeoPoint>,
{
    let (lats, lons): (Vec<f64>, Vec<f64>) = points.into_iter().map(|p| (p.lat, p.lon)).unzip();
    let (ymin, ymax) = trimmed_extent(lats, trim)?;
    let (xmin, xmax) = trimmed_extent(lons, trim)?;
    Some(GeoPoint::new((ymin + ymax) / 2.0, (xmin + xmax) / 2.0))
}
