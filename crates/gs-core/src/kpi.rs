//! The closed set of KPI kinds and how a switch-off adjusts each one.
//!
//! Every per-KPI decision (measurement column, dashboard tab, adjustment
//! rule, default visualization) is an exhaustive `match` on [`KpiKind`].
//! Strings are parsed once at the boundary; an unknown name is a
//! [`CoreError::InvalidSelection`], never a silent no-op.

use std::fmt;
use std::str::FromStr;

use crate::profile::{ColorScaleId, VisualProfile};
use crate::{CoreError, CoreResult};

/// A pixel-level KPI that can be queried, simulated, and rendered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KpiKind {
    /// Mean downlink user throughput (Mbps).
    UserThroughput,
    /// Subscriber churn probability.
    ChurnProbability,
    /// Traffic actually carried (GB per pixel).
    ServedDemand,
    /// Demand that could not be served (GB per pixel).
    LatentDemand,
    /// Revenue at stake (USD per pixel).
    RevenuePotential,
    /// Bandwidth demand vs. capacity (MHz, signed).
    CapacityDemand,
    /// RSRP (dBm).
    SignalLevel,
    /// CQI.
    QualityIndex,
    Roi,
    Npv,
    /// Months until the serving sector congests.
    TimeToCongestion,
}

/// How a switch-off transforms a baseline pixel value of one KPI.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Adjustment {
    /// `v / offload`: per-user rates.
    DivideByOffload,
    /// `v * offload`: demand-like KPIs.
    MultiplyByOffload,
    /// Replaced by the sample-weighted RSRP of the surviving sectors.
    ReallocatedSignal,
    /// Replaced by the sample-weighted CQI of the surviving sectors.
    ReallocatedQuality,
    /// Unchanged.
    Identity,
}

impl KpiKind {
    pub const ALL: [KpiKind; 11] = [
        KpiKind::UserThroughput,
        KpiKind::ChurnProbability,
        KpiKind::ServedDemand,
        KpiKind::LatentDemand,
        KpiKind::RevenuePotential,
        KpiKind::CapacityDemand,
        KpiKind::SignalLevel,
        KpiKind::QualityIndex,
        KpiKind::Roi,
        KpiKind::Npv,
        KpiKind::TimeToCongestion,
    ];

    /// Measurement-store column name.
    pub fn column(self) -> &'static str {
        match self {
            KpiKind::UserThroughput   => "geo_user_tput_dl",
            KpiKind::ChurnProbability => "geo_churn_prob",
            KpiKind::ServedDemand     => "geo_served_demand",
            KpiKind::LatentDemand     => "geo_latent_demand",
            KpiKind::RevenuePotential => "geo_revenue_potential",
            KpiKind::CapacityDemand   => "geo_cap_demand",
            KpiKind::SignalLevel      => "geo_rsrp",
            KpiKind::QualityIndex     => "geo_cqi",
            KpiKind::Roi              => "roi",
            KpiKind::Npv              => "npv",
            KpiKind::TimeToCongestion => "ttc",
        }
    }

    /// Dashboard tab that displays this KPI.
    pub fn selection_tab(self) -> &'static str {
        match self {
            KpiKind::UserThroughput   => "QoE",
            KpiKind::ChurnProbability => "Churn",
            KpiKind::ServedDemand     => "Served Demand",
            KpiKind::LatentDemand     => "Latent Demand",
            KpiKind::RevenuePotential => "Revenue Potential",
            KpiKind::CapacityDemand   => "Capacity Management",
            KpiKind::SignalLevel      => "Coverage Signal Level",
            KpiKind::QualityIndex     => "Coverage Quality",
            KpiKind::Roi              => "ROI",
            KpiKind::Npv              => "NPV",
            KpiKind::TimeToCongestion => "TTC",
        }
    }

    /// Parse a measurement-store column name (`"geo_rsrp"`, …).
    pub fn from_column(column: &str) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.column() == column)
            .ok_or_else(|| CoreError::selection("KPI", column))
    }

    /// Parse a dashboard tab label (`"QoE"`, `"Coverage Quality"`, …).
    pub fn from_selection_tab(tab: &str) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.selection_tab() == tab)
            .ok_or_else(|| CoreError::selection("visualization tab", tab))
    }

    /// `true` if per-sector records carry this KPI.  The remaining kinds
    /// only exist in the per-pixel aggregate.
    pub fn in_sector_table(self) -> bool {
        !matches!(
            self,
            KpiKind::RevenuePotential | KpiKind::Roi | KpiKind::Npv | KpiKind::TimeToCongestion
        )
    }

    /// The rule applied to this KPI when sites are switched off.
    pub fn adjustment(self) -> Adjustment {
        match self {
            KpiKind::UserThroughput => Adjustment::DivideByOffload,
            KpiKind::ChurnProbability
            | KpiKind::ServedDemand
            | KpiKind::LatentDemand
            | KpiKind::RevenuePotential => Adjustment::MultiplyByOffload,
            KpiKind::SignalLevel => Adjustment::ReallocatedSignal,
            KpiKind::QualityIndex => Adjustment::ReallocatedQuality,
            KpiKind::CapacityDemand
            | KpiKind::Roi
            | KpiKind::Npv
            | KpiKind::TimeToCongestion => Adjustment::Identity,
        }
    }

    /// Default value range, color scale and legend title for map rendering.
    pub fn profile(self) -> VisualProfile {
        use ColorScaleId::*;
        let (no_data, vmin, vmax, scale, legend_title) = match self {
            KpiKind::UserThroughput   => (0.0, 0.0, 13.0, RdYlGn, "User DL Tput (Mbps)"),
            KpiKind::ChurnProbability => (0.01, 0.01, 0.5, Reds, "Churn Probability (%)"),
            KpiKind::ServedDemand     => (0.0, 0.0, 2.0, Greens, "Served Traffic (GB per 50x50m)"),
            KpiKind::LatentDemand     => (0.0, 0.0, 0.2, Reds, "Latent Demand (GB per 50x50m)"),
            KpiKind::RevenuePotential => (0.0, 50.0, 2000.0, Reds, "Revenue Potential (USD per 50x50m)"),
            KpiKind::CapacityDemand   => (0.0, -0.3, 0.3, Coolwarm, "Capacity BW\n Demand (Mhz)"),
            KpiKind::SignalLevel      => (0.0, -115.0, -60.0, RdYlGn, "RSRP (dBm)"),
            KpiKind::QualityIndex     => (0.0, 5.0, 13.0, RdYlGn, "CQI"),
            KpiKind::Roi              => (0.0, 0.0, 5.0, RdYlGn, "ROI"),
            KpiKind::Npv              => (0.0, -100_000.0, 100_000.0, RdYlGn, "Net Present Value (USD)"),
            KpiKind::TimeToCongestion => (0.0, 0.0, 12.0, RdYlGn, "Time To Congestions (Months)"),
        };
        VisualProfile { no_data, vmin, vmax, scale, legend_title }
    }
}

impl FromStr for KpiKind {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::from_column(s)
    }
}

impl fmt::Display for KpiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}
