//! Competitive-benchmark tables and best-server rows.
//!
//! Benchmark data comes from crowd-sourced measurements of every provider in
//! the market, not from the simulator, so its rows do not share the
//! `pixel_sector`/`pixel_agg` shape.  Two tables exist:
//!
//! | Table             | Provider column                       | Filtered on       |
//! |-------------------|---------------------------------------|-------------------|
//! | `csp_details_pop` | `Connection_ServiceProviderBrandName` | `QOS_RSRP` range  |
//! | `compet_cat_pop`  | `target_csp`                          | the metric, `> 0` |
//!
//! Both carry `Latitude`, `Longitude`, `band_category`, `roads_proximity`
//! and `population`; every other numeric column is a selectable metric.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::geo::GeoSample;
use crate::ids::{PixelIndex, SectorId};
use crate::scenario::ValueRange;
use crate::{CoreError, CoreResult};

/// Signal-level column of the detail table.
pub const SIGNAL_COLUMN: &str = "QOS_RSRP";

// ── Metric column ─────────────────────────────────────────────────────────────

/// Name of a numeric benchmark column, e.g. `QOS_RSRP` or `dl_score`.
///
/// Benchmark metrics are an open set, unlike [`KpiKind`](crate::KpiKind).
/// Names are restricted to ASCII letters, digits and `_`, not starting with
/// a digit, so they can be spliced into SQL as identifiers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct MetricColumn(String);

impl MetricColumn {
    pub fn new(name: &str) -> CoreResult<Self> {
        let mut chars = name.chars();
        let head_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Ok(Self(name.to_owned()))
        } else {
            Err(CoreError::selection("metric column", name))
        }
    }

    pub fn signal_level() -> Self {
        Self(SIGNAL_COLUMN.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MetricColumn {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for MetricColumn {
    type Error = CoreError;

    fn try_from(s: String) -> CoreResult<Self> {
        Self::new(&s)
    }
}

impl From<MetricColumn> for String {
    fn from(c: MetricColumn) -> String {
        c.0
    }
}

impl fmt::Display for MetricColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Tables and rows ───────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompetitiveTable {
    /// Per-measurement detail, `csp_details_pop`.
    Detail,
    /// Per-category scores, `compet_cat_pop`.
    Category,
}

impl CompetitiveTable {
    pub fn table_name(self) -> &'static str {
        match self {
            CompetitiveTable::Detail   => "csp_details_pop",
            CompetitiveTable::Category => "compet_cat_pop",
        }
    }

    /// Column holding the provider brand.
    pub fn provider_column(self) -> &'static str {
        match self {
            CompetitiveTable::Detail   => "Connection_ServiceProviderBrandName",
            CompetitiveTable::Category => "target_csp",
        }
    }
}

impl fmt::Display for CompetitiveTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// One row of either benchmark table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompetitiveRecord {
    pub latitude:        f64,
    pub longitude:       f64,
    pub provider:        String,
    pub band_category:   String,
    pub roads_proximity: i32,
    pub population:      Option<f64>,
    /// Every other numeric column by name; missing cells are absent.
    pub metrics:         BTreeMap<String, f64>,
}

impl CompetitiveRecord {
    pub fn metric(&self, column: &MetricColumn) -> Option<f64> {
        self.metrics.get(column.as_str()).copied()
    }

    pub fn signal_level(&self) -> Option<f64> {
        self.metrics.get(SIGNAL_COLUMN).copied()
    }
}

// ── Query ─────────────────────────────────────────────────────────────────────

/// Table-specific part of a [`CompetitiveQuery`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompetitiveSource {
    /// Detail rows whose signal level lies in `signal_range`.
    Detail { signal_range: ValueRange },
    /// Category rows whose metric lies in `value_range` and is strictly
    /// positive.
    Category { value_range: ValueRange },
}

impl CompetitiveSource {
    pub fn table(&self) -> CompetitiveTable {
        match self {
            CompetitiveSource::Detail { .. }   => CompetitiveTable::Detail,
            CompetitiveSource::Category { .. } => CompetitiveTable::Category,
        }
    }
}

/// Parameters for a competitive-benchmark map.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompetitiveQuery {
    pub provider:        String,
    pub band_category:   String,
    /// `None` accepts every road-proximity class.
    pub roads_proximity: Option<i32>,
    pub population:      ValueRange,
    pub metric:          MetricColumn,
    pub source:          CompetitiveSource,
}

impl CompetitiveQuery {
    pub fn new(
        provider:      impl Into<String>,
        band_category: impl Into<String>,
        metric:        MetricColumn,
        source:        CompetitiveSource,
    ) -> Self {
        Self {
            provider: provider.into(),
            band_category: band_category.into(),
            roads_proximity: None,
            population: ValueRange::unbounded(),
            metric,
            source,
        }
    }

    /// Restrict to one road-proximity class.  `0` means "any", as in the
    /// dashboard's selector.
    pub fn roads_proximity(mut self, class: i32) -> Self {
        self.roads_proximity = (class != 0).then_some(class);
        self
    }

    pub fn population(mut self, range: ValueRange) -> Self {
        self.population = range;
        self
    }

    /// `true` if `record`, taken from `self.source.table()`, passes every filter.
    pub fn accepts(&self, record: &CompetitiveRecord) -> bool {
        let common = record.provider == self.provider
            && record.band_category == self.band_category
            && self.roads_proximity.is_none_or(|class| record.roads_proximity == class)
            && self.population.contains(record.population);
        common
            && match self.source {
                CompetitiveSource::Detail { signal_range } => signal_range.contains(record.signal_level()),
                CompetitiveSource::Category { value_range } => {
                    let value = record.metric(&self.metric);
                    value_range.contains(value) && value.is_some_and(|v| v > 0.0)
                }
            }
    }

    pub fn sample(&self, record: &CompetitiveRecord) -> CompetitiveSample {
        CompetitiveSample {
            latitude:   record.latitude,
            longitude:  record.longitude,
            population: record.population,
            value:      record.metric(&self.metric),
        }
    }
}

/// One benchmark measurement projected to the requested metric.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompetitiveSample {
    pub latitude:   f64,
    pub longitude:  f64,
    pub population: Option<f64>,
    pub value:      Option<f64>,
}

impl CompetitiveSample {
    #[inline]
    pub fn sample(&self) -> GeoSample {
        GeoSample::new(self.longitude, self.latitude, self.value)
    }
}

// ── Best server ───────────────────────────────────────────────────────────────

/// The sector serving a pixel best in the aggregate table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BestServerSample {
    pub pixel_index: PixelIndex,
    pub latitude:    f64,
    pub longitude:   f64,
    pub sector:      SectorId,
}
