//! Per-pixel switch-off aggregation.

use gs_core::{PixelIndex, PixelRecord, SiteSet};

use crate::PixelMap;

/// Traffic and radio summary of one affected pixel after a switch-off.
///
/// Invariants: `coverage_loss` holds iff no surviving sector carries
/// traffic, and `offload_coefficient` is `Some` iff `!coverage_loss`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SwitchOffAggregate {
    pub pixel_index:               PixelIndex,
    /// Demand carried by the removed sectors.
    pub traffic_switched_off:      f64,
    /// Demand carried by the sectors that stay on air.
    pub traffic_remaining:         f64,
    /// `(switched_off + remaining) / remaining`.
    pub offload_coefficient:       Option<f64>,
    pub coverage_loss:             bool,
    /// Sample-weighted RSRP over surviving sectors.
    pub reallocated_signal_level:  Option<f64>,
    /// Sample-weighted CQI over surviving sectors.
    pub reallocated_quality_index: Option<f64>,
}

/// Aggregates for every affected pixel, ordered by pixel index.
#[derive(Clone, Debug, Default)]
pub struct SwitchOffTable {
    rows:  Vec<SwitchOffAggregate>,
    index: PixelMap<usize>,
}

impl SwitchOffTable {
    fn from_rows(rows: Vec<SwitchOffAggregate>) -> Self {
        let index = rows.iter().enumerate().map(|(i, r)| (r.pixel_index, i)).collect();
        Self { rows, index }
    }

    pub fn get(&self, pixel: &PixelIndex) -> Option<&SwitchOffAggregate> {
        self.index.get(pixel).map(|&i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SwitchOffAggregate> {
        self.rows.iter()
    }

    pub fn as_slice(&self) -> &[SwitchOffAggregate] {
        &self.rows
    }

    pub fn coverage_loss_count(&self) -> usize {
        self.rows.iter().filter(|r| r.coverage_loss).count()
    }
}

impl<'a> IntoIterator for &'a SwitchOffTable {
    type Item = &'a SwitchOffAggregate;
    type IntoIter = std::slice::Iter<'a, SwitchOffAggregate>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// ── Aggregation ───────────────────────────────────────────────────────────────

/// Build the switch-off table for `records`.
///
/// Only pixels with at least one record from a site in `sites` are
/// aggregated; records on other pixels are ignored.  An empty `sites`
/// yields an empty table.
pub fn aggregate_switch_off(records: &[PixelRecord], sites: &SiteSet) -> SwitchOffTable {
    if sites.is_empty() {
        return SwitchOffTable::default();
    }

    let mut groups: PixelMap<Vec<&PixelRecord>> = PixelMap::default();
    for record in records {
        groups.entry(record.pixel_index).or_default().push(record);
    }

    let mut affected: Vec<(PixelIndex, Vec<&PixelRecord>)> = groups
        .into_iter()
        .filter(|(_, rs)| rs.iter().any(|r| sites.contains(&r.site_id)))
        .collect();
    affected.sort_unstable_by_key(|(pixel, _)| *pixel);

    #[cfg(not(feature = "parallel"))]
    let rows: Vec<SwitchOffAggregate> = affected
        .iter()
        .map(|(pixel, rs)| aggregate_pixel(*pixel, rs, sites))
        .collect();

    #[cfg(feature = "parallel")]
    let rows: Vec<SwitchOffAggregate> = {
        use rayon::prelude::*;
        affected
            .par_iter()
            .map(|(pixel, rs)| aggregate_pixel(*pixel, rs, sites))
            .collect()
    };

    SwitchOffTable::from_rows(rows)
}

fn aggregate_pixel(pixel: PixelIndex, records: &[&PixelRecord], sites: &SiteSet) -> SwitchOffAggregate {
    let mut switched_off = 0.0;
    let mut remaining = 0.0;
    let mut signal = WeightedMean::default();
    let mut quality = WeightedMean::default();

    for r in records {
        let demand = r.served_demand.unwrap_or(0.0);
        if sites.contains(&r.site_id) {
            switched_off += demand;
        } else {
            remaining += demand;
            signal.push(r.signal_level, r.sample_count);
            quality.push(r.quality_index, r.sample_count);
        }
    }

    // Negative or NaN remaining demand is treated like zero.
    let coverage_loss = !(remaining > 0.0);
    let offload_coefficient = (!coverage_loss).then(|| (switched_off + remaining) / remaining);

    SwitchOffAggregate {
        pixel_index: pixel,
        traffic_switched_off: switched_off,
        traffic_remaining: remaining,
        offload_coefficient,
        coverage_loss,
        reallocated_signal_level: signal.value(),
        reallocated_quality_index: quality.value(),
    }
}

/// `Σ(v·n) / Σ(n)` over entries that have both a value and a positive count.
#[derive(Default)]
struct WeightedMean {
    num: f64,
    den: f64,
}

impl WeightedMean {
    fn push(&mut self, value: Option<f64>, count: Option<u32>) {
        match (value, count) {
            (Some(v), Some(n)) if n > 0 && v.is_finite() => {
                self.num += v * f64::from(n);
                self.den += f64::from(n);
            }
            _ => {}
        }
    }

    fn value(&self) -> Option<f64> {
        (self.den > 0.0).then(|| self.num / self.den)
    }
}
