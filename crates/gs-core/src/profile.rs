//! Visualization profiles and color-scale identifiers.
//!
//! The actual color data lives in `gs-render`; this module only names the
//! scales so that [`KpiKind::profile`](crate::KpiKind::profile) can carry
//! its default scale as plain data.

use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

/// Identifier of a continuous color scale.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorScaleId {
    /// Diverging red → yellow → green.
    RdYlGn,
    /// Sequential white → dark red.
    Reds,
    /// Sequential white → dark green.
    Greens,
    /// Diverging blue → light grey → red.
    Coolwarm,
}

impl ColorScaleId {
    pub const ALL: [ColorScaleId; 4] = [
        ColorScaleId::RdYlGn,
        ColorScaleId::Reds,
        ColorScaleId::Greens,
        ColorScaleId::Coolwarm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorScaleId::RdYlGn   => "RdYlGn",
            ColorScaleId::Reds     => "Reds",
            ColorScaleId::Greens   => "Greens",
            ColorScaleId::Coolwarm => "coolwarm",
        }
    }
}

impl FromStr for ColorScaleId {
    type Err = CoreError;

    /// Case-insensitive.  Unknown names are an error on every call site;
    /// there is no fallback scale.
    fn from_str(s: &str) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::selection("color scale", s))
    }
}

impl fmt::Display for ColorScaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How one KPI is drawn: value range, no-data sentinel, scale, and title.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VisualProfile {
    /// Raster fill for cells without a sample; rendered transparent.
    pub no_data:      f64,
    pub vmin:         f64,
    pub vmax:         f64,
    pub scale:        ColorScaleId,
    pub legend_title: &'static str,
}

impl VisualProfile {
    /// Override the value range, keeping scale and no-data.
    pub fn with_range(self, vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax, ..self }
    }
}
