//! `gs-sim` — what happens to a pixel when its serving sites go dark.
//!
//! # Reallocation model
//!
//! ```text
//! for every pixel served by at least one removed site:
//!   switched_off = Σ served_demand   over removed sectors
//!   remaining    = Σ served_demand   over surviving sectors
//!   rsrp', cqi'  = sample-weighted mean over surviving sectors
//!   coverage_loss  ⇔ remaining == 0
//!   offload        = (switched_off + remaining) / remaining   (if remaining > 0)
//!
//! for every baseline pixel:
//!   affected & coverage loss  → value = None
//!   affected                  → value = adjust(kpi, value, aggregate)
//!   not affected              → value unchanged
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Per-pixel aggregation and adjustment on Rayon.           |
//! | `fx-hash`  | FxHash for the pixel grouping map.                       |
//! | `parquet`  | `write_aggregates_parquet` export.                       |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let records  = repo.switch_off_records(&scenario, &sites)?;
//! let baseline = repo.baseline(&query)?;
//! let outcome  = gs_sim::simulate(&records, &baseline, &sites, KpiKind::UserThroughput);
//! let samples  = outcome.samples();
//! ```

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod export;

#[cfg(test)]
mod tests;

pub use aggregate::{aggregate_switch_off, SwitchOffAggregate, SwitchOffTable};
pub use engine::{adjust_value, simulate, AdjustedPixel, SimulationOutcome};
pub use error::{SimError, SimResult};
pub use export::{write_aggregates_csv, write_aggregates_writer};

#[cfg(feature = "parquet")]
pub use export::write_aggregates_parquet;

// ── Pixel-keyed map ───────────────────────────────────────────────────────────

#[cfg(feature = "fx-hash")]
pub(crate) type PixelMap<V> = rustc_hash::FxHashMap<gs_core::PixelIndex, V>;

#[cfg(not(feature = "fx-hash"))]
pub(crate) type PixelMap<V> = std::collections::HashMap<gs_core::PixelIndex, V>;
