//! Scenario keys and the query parameters accepted by the measurement
//! repository.

use crate::ids::{SectorId, SiteId};
use crate::kpi::KpiKind;
use crate::{CoreError, CoreResult};

/// Traffic scenario ids are stored as floats; two ids closer than this are
/// the same scenario.
pub const TRAFFIC_SCENARIO_TOLERANCE: f64 = 1e-4;

/// Identifies one simulated world: traffic growth scenario, optimization
/// scenario and forecast year.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioKey {
    pub traffic_scenario:      f64,
    pub optimization_scenario: i32,
    pub year:                  i32,
}

impl ScenarioKey {
    pub fn new(traffic_scenario: f64, optimization_scenario: i32, year: i32) -> Self {
        Self { traffic_scenario, optimization_scenario, year }
    }

    /// Equality with tolerance on the traffic id, exact on the rest.
    pub fn matches(&self, other: &ScenarioKey) -> bool {
        (self.traffic_scenario - other.traffic_scenario).abs() < TRAFFIC_SCENARIO_TOLERANCE
            && self.optimization_scenario == other.optimization_scenario
            && self.year == other.year
    }
}

/// Inclusive `[min, max]` filter.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Validated constructor: both bounds finite and `min <= max`.
    pub fn new(min: f64, max: f64) -> CoreResult<Self> {
        if min.is_finite() && max.is_finite() && min <= max {
            Ok(Self { min, max })
        } else {
            Err(CoreError::InvalidRange { min, max })
        }
    }

    /// A range that accepts every finite value.
    pub fn unbounded() -> Self {
        Self { min: f64::MIN, max: f64::MAX }
    }

    /// `None` never passes: a pixel without a measurement cannot satisfy a
    /// range filter.
    #[inline]
    pub fn contains(&self, value: Option<f64>) -> bool {
        value.is_some_and(|v| v >= self.min && v <= self.max)
    }
}

/// Which sectors a sector-level KPI map covers.
#[derive(Clone, Debug, PartialEq)]
pub enum SectorSelection {
    Sectors(Vec<SectorId>),
    /// Every sector hosted on the site.
    Site(SiteId),
}

impl SectorSelection {
    pub fn includes(&self, site: &SiteId, sector: &SectorId) -> bool {
        match self {
            SectorSelection::Sectors(ids) => ids.contains(sector),
            SectorSelection::Site(id) => id == site,
        }
    }
}

/// Parameters for the per-pixel baseline query.
#[derive(Clone, Debug, PartialEq)]
pub struct BaselineQuery {
    pub kpi:           KpiKind,
    pub scenario:      ScenarioKey,
    pub signal_range:  ValueRange,
    pub quality_range: ValueRange,
}

impl BaselineQuery {
    pub fn new(kpi: KpiKind, scenario: ScenarioKey) -> Self {
        Self {
            kpi,
            scenario,
            signal_range:  ValueRange::unbounded(),
            quality_range: ValueRange::unbounded(),
        }
    }

    pub fn signal_range(mut self, range: ValueRange) -> Self {
        self.signal_range = range;
        self
    }

    pub fn quality_range(mut self, range: ValueRange) -> Self {
        self.quality_range = range;
        self
    }

    /// `true` if a row with these tags and radio values passes the filter.
    pub fn accepts(
        &self,
        scenario: &ScenarioKey,
        signal:   Option<f64>,
        quality:  Option<f64>,
    ) -> bool {
        self.scenario.matches(scenario)
            && self.signal_range.contains(signal)
            && self.quality_range.contains(quality)
    }
}

/// Parameters for a sector- or site-level KPI map.
#[derive(Clone, Debug, PartialEq)]
pub struct SectorQuery {
    pub baseline:  BaselineQuery,
    pub selection: SectorSelection,
}
