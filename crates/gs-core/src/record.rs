//! Measurement rows as delivered by the measurement repository.

use crate::geo::{GeoPoint, GeoSample};
use crate::ids::{PixelIndex, SectorId, SiteId};
use crate::kpi::KpiKind;
use crate::scenario::ScenarioKey;

/// One serving sector's measurements at one pixel for one scenario/year.
///
/// Several records share a `pixel_index` when several sectors cover the
/// same cell.  Missing measurements are `None`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelRecord {
    pub pixel_index:       PixelIndex,
    pub latitude:          f64,
    pub longitude:         f64,
    pub site_id:           SiteId,
    pub sector_id:         SectorId,
    pub signal_level:      Option<f64>,
    pub quality_index:     Option<f64>,
    pub served_demand:     Option<f64>,
    pub latent_demand:     Option<f64>,
    pub capacity_demand:   Option<f64>,
    pub churn_probability: Option<f64>,
    pub user_throughput:   Option<f64>,
    pub sample_count:      Option<u32>,
    pub scenario:          ScenarioKey,
}

impl PixelRecord {
    /// Sector-level value of `kpi`, if the sector table carries it.
    ///
    /// Revenue, ROI, NPV and time-to-congestion only exist per pixel
    /// (see [`AggregateRecord`]) and always yield `None` here.
    pub fn kpi_value(&self, kpi: KpiKind) -> Option<f64> {
        match kpi {
            KpiKind::UserThroughput   => self.user_throughput,
            KpiKind::ChurnProbability => self.churn_probability,
            KpiKind::ServedDemand     => self.served_demand,
            KpiKind::LatentDemand     => self.latent_demand,
            KpiKind::CapacityDemand   => self.capacity_demand,
            KpiKind::SignalLevel      => self.signal_level,
            KpiKind::QualityIndex     => self.quality_index,
            KpiKind::RevenuePotential
            | KpiKind::Roi
            | KpiKind::Npv
            | KpiKind::TimeToCongestion => None,
        }
    }

    #[inline]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn sample(&self, kpi: KpiKind) -> GeoSample {
        GeoSample::new(self.longitude, self.latitude, self.kpi_value(kpi))
    }
}

/// Per-pixel baseline aggregated over every serving sector.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregateRecord {
    pub pixel_index:        PixelIndex,
    pub latitude:           f64,
    pub longitude:          f64,
    pub signal_level:       Option<f64>,
    pub quality_index:      Option<f64>,
    pub user_throughput:    Option<f64>,
    pub churn_probability:  Option<f64>,
    pub served_demand:      Option<f64>,
    pub latent_demand:      Option<f64>,
    pub capacity_demand:    Option<f64>,
    pub revenue_potential:  Option<f64>,
    pub roi:                Option<f64>,
    pub npv:                Option<f64>,
    pub time_to_congestion: Option<f64>,
    /// Sector with the strongest signal on this pixel, when known.
    pub best_server:        Option<SectorId>,
    pub scenario:           ScenarioKey,
}

impl AggregateRecord {
    pub fn kpi_value(&self, kpi: KpiKind) -> Option<f64> {
        match kpi {
            KpiKind::UserThroughput   => self.user_throughput,
            KpiKind::ChurnProbability => self.churn_probability,
            KpiKind::ServedDemand     => self.served_demand,
            KpiKind::LatentDemand     => self.latent_demand,
            KpiKind::RevenuePotential => self.revenue_potential,
            KpiKind::CapacityDemand   => self.capacity_demand,
            KpiKind::SignalLevel      => self.signal_level,
            KpiKind::QualityIndex     => self.quality_index,
            KpiKind::Roi              => self.roi,
            KpiKind::Npv              => self.npv,
            KpiKind::TimeToCongestion => self.time_to_congestion,
        }
    }

    /// Project this row onto a single KPI.
    pub fn to_baseline(&self, kpi: KpiKind) -> BaselinePixel {
        BaselinePixel {
            pixel_index:   self.pixel_index,
            latitude:      self.latitude,
            longitude:     self.longitude,
            signal_level:  self.signal_level,
            quality_index: self.quality_index,
            value:         self.kpi_value(kpi),
        }
    }
}

/// One pixel of the baseline KPI surface for a single requested KPI.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaselinePixel {
    pub pixel_index:   PixelIndex,
    pub latitude:      f64,
    pub longitude:     f64,
    pub signal_level:  Option<f64>,
    pub quality_index: Option<f64>,
    pub value:         Option<f64>,
}

impl BaselinePixel {
    #[inline]
    pub fn sample(&self) -> GeoSample {
        GeoSample::new(self.longitude, self.latitude, self.value)
    }
}
