//! Discrete color legends.

use std::collections::HashMap;
use std::sync::Arc;

use gs_core::ColorScaleId;
use parking_lot::Mutex;

use crate::{check_range, ColorScale, RenderResult};

/// One legend stop.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LegendEntry {
    pub value: f64,
    /// `value` with two decimals.
    pub label: String,
    pub color: [u8; 3],
}

impl LegendEntry {
    /// Six lowercase hex digits, no leading `#`.
    pub fn hex(&self) -> String {
        let [r, g, b] = self.color;
        format!("{r:02x}{g:02x}{b:02x}")
    }
}

/// Ordered legend for one `(scale, vmin, vmax, n)`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ColorLegend {
    pub scale:   ColorScaleId,
    pub vmin:    f64,
    pub vmax:    f64,
    pub entries: Vec<LegendEntry>,
}

impl ColorLegend {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(label, hex)` pairs in ascending value order.
    pub fn label_hex_pairs(&self) -> Vec<(String, String)> {
        self.entries.iter().map(|e| (e.label.clone(), e.hex())).collect()
    }
}

/// `n` stops at `vmin + (vmax - vmin)·i/(n-1)`.
///
/// `n = 1` yields a single stop at `vmin`; `n = 0` an empty legend.
pub fn build_legend(scale: ColorScale, vmin: f64, vmax: f64, n: usize) -> RenderResult<ColorLegend> {
    let range = check_range(vmin, vmax)?;
    let span = range.max - range.min;
    let entries = (0..n)
        .map(|i| {
            let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            let value = range.min + span * t;
            LegendEntry { value, label: format!("{value:.2}"), color: scale.at(t) }
        })
        .collect();
    Ok(ColorLegend { scale: scale.id(), vmin, vmax, entries })
}

/// Legend for a scale given by name.  Unknown names are an error here as
/// everywhere else.
pub fn legend_for_scale_name(name: &str, vmin: f64, vmax: f64, n: usize) -> RenderResult<ColorLegend> {
    let scale = ColorScale::by_name(name)?;
    build_legend(scale, vmin, vmax, n)
}

// ── Cache ─────────────────────────────────────────────────────────────────────

type LegendKey = (ColorScaleId, u64, u64, usize);

/// Shared memo of built legends, safe to use from concurrent requests.
#[derive(Default)]
pub struct LegendCache {
    entries: Mutex<HashMap<LegendKey, Arc<ColorLegend>>>,
}

impl LegendCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached legend for the key, building it on first use.  Invalid ranges
    /// are never cached.
    pub fn get_or_build(&self, scale: ColorScale, vmin: f64, vmax: f64, n: usize) -> RenderResult<Arc<ColorLegend>> {
        let key = (scale.id(), vmin.to_bits(), vmax.to_bits(), n);
        if let Some(hit) = self.entries.lock().get(&key) {
            return Ok(Arc::clone(hit));
        }
        let built = Arc::new(build_legend(scale, vmin, vmax, n)?);
        let mut map = self.entries.lock();
        Ok(Arc::clone(map.entry(key).or_insert(built)))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
