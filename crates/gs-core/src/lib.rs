//! `gs-core` — foundational types for the `geosim` switch-off workspace.
//!
//! This crate is a dependency of every other `gs-*` crate.  It has no
//! `gs-*` dependencies and minimal external ones (only `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                             |
//! |-----------------|------------------------------------------------------|
//! | [`ids`]         | `PixelIndex`, `SiteId`, `SectorId`, `SiteSet`        |
//! | [`geo`]         | `GeoPoint`, `GeoSample`, `BoundingBox`               |
//! | [`kpi`]         | `KpiKind`, `Adjustment`                              |
//! | [`profile`]     | `VisualProfile`, `ColorScaleId`                      |
//! | [`record`]      | `PixelRecord`, `AggregateRecord`, `BaselinePixel`    |
//! | [`scenario`]    | `ScenarioKey`, `ValueRange`, query parameter structs |
//! | [`competitive`] | Benchmark rows and queries, `BestServerSample`       |
//! | [`clock`]       | `Clock` trait, `SystemClock`, `ManualClock`          |
//! | [`error`]       | `CoreError`, `CoreResult`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public data types.   |

pub mod clock;
pub mod competitive;
pub mod error;
pub mod geo;
pub mod ids;
pub mod kpi;
pub mod profile;
pub mod record;
pub mod scenario;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use clock::{Clock, ManualClock, SystemClock};
pub use competitive::{
    BestServerSample, CompetitiveQuery, CompetitiveRecord, CompetitiveSample, CompetitiveSource,
    CompetitiveTable, MetricColumn,
};
pub use error::{CoreError, CoreResult};
pub use geo::{BoundingBox, GeoPoint, GeoSample};
pub use ids::{PixelIndex, SectorId, SiteId, SiteSet};
pub use kpi::{Adjustment, KpiKind};
pub use profile::{ColorScaleId, VisualProfile};
pub use record::{AggregateRecord, BaselinePixel, PixelRecord};
pub use scenario::{BaselineQuery, ScenarioKey, SectorQuery, SectorSelection, ValueRange};
