//! Baseline adjustment: the post-switch-off KPI surface.

use gs_core::{Adjustment, BaselinePixel, GeoSample, KpiKind, PixelIndex, PixelRecord, SiteSet};

use crate::aggregate::{aggregate_switch_off, SwitchOffAggregate, SwitchOffTable};

/// One output pixel of a simulation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AdjustedPixel {
    pub pixel_index:   PixelIndex,
    pub latitude:      f64,
    pub longitude:     f64,
    /// `None` when the pixel lost coverage or had no baseline value.
    pub value:         Option<f64>,
    pub coverage_loss: bool,
}

impl AdjustedPixel {
    fn unchanged(b: &BaselinePixel) -> Self {
        Self {
            pixel_index:   b.pixel_index,
            latitude:      b.latitude,
            longitude:     b.longitude,
            value:         b.value,
            coverage_loss: false,
        }
    }

    #[inline]
    pub fn sample(&self) -> GeoSample {
        GeoSample::new(self.longitude, self.latitude, self.value)
    }
}

/// Result of [`simulate`].
#[derive(Clone, Debug)]
pub struct SimulationOutcome {
    pub kpi:        KpiKind,
    /// One entry per baseline pixel, in baseline order.
    pub pixels:     Vec<AdjustedPixel>,
    /// Aggregates for the affected pixels; empty when no site was removed.
    pub aggregates: SwitchOffTable,
}

impl SimulationOutcome {
    pub fn get(&self, pixel: PixelIndex) -> Option<&AdjustedPixel> {
        self.pixels.iter().find(|p| p.pixel_index == pixel)
    }

    /// Rasterizer input.
    pub fn samples(&self) -> Vec<GeoSample> {
        self.pixels.iter().map(AdjustedPixel::sample).collect()
    }

    pub fn coverage_loss_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.coverage_loss).count()
    }
}

/// Apply the switch-off rule for `kpi` to one baseline value.
pub fn adjust_value(kpi: KpiKind, value: Option<f64>, agg: &SwitchOffAggregate) -> Option<f64> {
    if agg.coverage_loss {
        return None;
    }
    match kpi.adjustment() {
        Adjustment::DivideByOffload => value.zip(agg.offload_coefficient).map(|(v, k)| v / k),
        Adjustment::MultiplyByOffload => value.zip(agg.offload_coefficient).map(|(v, k)| v * k),
        Adjustment::ReallocatedSignal => agg.reallocated_signal_level,
        Adjustment::ReallocatedQuality => agg.reallocated_quality_index,
        Adjustment::Identity => value,
    }
}

/// Recompute `baseline` as if every site in `sites` were switched off.
///
/// `records` are the sector rows of the affected pixels (see
/// `MeasurementRepository::switch_off_records`).  Baseline pixels outside
/// the affected set pass through unchanged; affected pixels missing from
/// the baseline produce no output.
pub fn simulate(
    records:  &[PixelRecord],
    baseline: &[BaselinePixel],
    sites:    &SiteSet,
    kpi:      KpiKind,
) -> SimulationOutcome {
    if sites.is_empty() {
        tracing::debug!(%kpi, pixels = baseline.len(), "no sites removed, baseline passes through");
        return SimulationOutcome {
            kpi,
            pixels:     baseline.iter().map(AdjustedPixel::unchanged).collect(),
            aggregates: SwitchOffTable::default(),
        };
    }

    let aggregates = aggregate_switch_off(records, sites);

    let adjust = |b: &BaselinePixel| match aggregates.get(&b.pixel_index) {
        None => AdjustedPixel::unchanged(b),
        Some(agg) => AdjustedPixel {
            value:         adjust_value(kpi, b.value, agg),
            coverage_loss: agg.coverage_loss,
            ..AdjustedPixel::unchanged(b)
        },
    };

    #[cfg(not(feature = "parallel"))]
    let pixels: Vec<AdjustedPixel> = baseline.iter().map(adjust).collect();

    #[cfg(feature = "parallel")]
    let pixels: Vec<AdjustedPixel> = {
        use rayon::prelude::*;
        baseline.par_iter().map(adjust).collect()
    };

    let outcome = SimulationOutcome { kpi, pixels, aggregates };
    tracing::info!(
        %kpi,
        %sites,
        affected = outcome.aggregates.len(),
        coverage_loss = outcome.aggregates.coverage_loss_count(),
        "switch-off simulated"
    );
    outcome
}
