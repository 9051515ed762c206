//! `gs-pipeline` — one map request, end to end.
//!
//! ```text
//! MeasurementRepository ──► simulate (switch-off only) ──► rasterize
//!        ──► colorize ──► ArtifactStore (sweep, then put) ──► Publisher
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`pipeline`] | `MapPipeline`, `MapPipelineBuilder`                          |
//! | [`request`]  | `SwitchOffRequest`, `CoverageRequest`, `SectorMapRequest`,   |
//! |              | `CompetitiveMapRequest`, `BestServerMapRequest`, `MapOutput` |
//! | [`config`]   | `PipelineConfig` (TOML), `GridConfig`, `Resolution`          |
//! | [`retry`]    | `RetryPolicy`, `RetryingRepository`                          |
//! | [`publish`]  | `Publisher` trait, `NoopPublisher`                           |
//! | [`observer`] | `PipelineObserver` trait, `NoopObserver`, `Stage`            |
//! | [`error`]    | `PipelineError`, `PipelineResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                   |
//! |------------|------------------------------------------|
//! | `parallel` | Rayon in the reallocation engine.        |
//! | `fx-hash`  | FxHash for the engine's per-pixel map.   |
//! | `sqlite`   | Enables `gs_repo::SqliteRepository`.     |

pub mod config;
pub mod error;
pub mod observer;
pub mod pipeline;
pub mod publish;
pub mod request;
pub mod retry;


pub use config::{GridConfig, ImageFormat, PipelineConfig, Resolution};
pub use error::{PipelineError, PipelineResult};
pub use observer::{NoopObserver, PipelineObserver, Stage};
pub use pipeline::{MapPipeline, MapPipelineBuilder};
pub use publish::{NoopPublisher, PublishError, Publisher};
pub use request::{
    BestServerMap, BestServerMapRequest, CompetitiveMapRequest, CoverageRequest, MapOutput, SectorMapRequest,
    SwitchOffRequest, SwitchOffSummary,
};
pub use retry::{RetryPolicy, RetryingRepository};
