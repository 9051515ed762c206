//! `gs-repo` — where pixel measurements come from.
//!
//! The simulation and rendering crates never talk to a database directly;
//! they receive a [`MeasurementRepository`] handle and ask it for rows.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`repository`] | `MeasurementRepository` trait                            |
//! | [`memory`]     | `MemoryRepository` (vectors held in RAM)                 |
//! | [`loader`]     | `load_sector_records_*`, `load_aggregates_*`,            |
//! |                | `load_competitive_*` CSV loaders                         |
//! | `sqlite`       | `SqliteRepository` (feature `sqlite`)                    |
//! | [`error`]      | `RepoError`, `RepoResult<T>`                             |
//!
//! # Tables
//!
//! Both the CSV files and the SQLite backend use the same row shapes:
//!
//! * `pixel_sector`    — one row per (pixel, serving sector, scenario, year).
//! * `pixel_agg`       — one row per (pixel, scenario, year), all KPIs and
//!   the best-serving sector.
//! * `csp_details_pop` — competitive benchmark, one row per measurement.
//! * `compet_cat_pop`  — competitive benchmark, per-category scores.

pub mod error;
pub mod loader;
pub mod memory;
pub mod repository;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use error::{RepoError, RepoResult};
pub use loader::{
    load_aggregates_csv, load_aggregates_reader, load_competitive_csv, load_competitive_reader,
    load_sector_records_csv, load_sector_records_reader,
};
pub use memory::MemoryRepository;
pub use repository::MeasurementRepository;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;
