//! `gs-store` — where rendered artifacts live until a publisher reads them.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`artifact`] | `ArtifactKind`, `ArtifactHandle`, `EvictionReport`        |
//! | [`store`]    | `ArtifactStore` trait                                     |
//! | [`fs`]       | `FsArtifactStore` (directory + name prefix)               |
//! | [`memory`]   | `MemoryArtifactStore`                                     |
//! | [`error`]    | `StoreError`, `StoreResult<T>`                            |
//!
//! Artifacts are written once, read once by the publisher, and deleted by a
//! sweep once older than the retention window.  Deletion is best-effort:
//! failures become [`EvictionWarning`]s, never errors.

pub mod artifact;
pub mod error;
pub mod fs;
pub mod memory;
pub mod store;


pub use artifact::{ArtifactHandle, ArtifactKind, EvictionReport, EvictionWarning, DEFAULT_RETENTION};
pub use error::{StoreError, StoreResult};
pub use fs::FsArtifactStore;
pub use memory::MemoryArtifactStore;
pub use store::ArtifactStore;
