//! Artifact metadata.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Artifacts older than this are eligible for eviction.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Single-band `f32` value raster.
    Raster,
    RgbImage,
    RgbaImage,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Raster    => "raster",
            ArtifactKind::RgbImage  => "rgb",
            ArtifactKind::RgbaImage => "rgba",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned by [`ArtifactStore::put`](crate::ArtifactStore::put).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactHandle {
    /// Unique within a store: `{prefix}_{kind}_{unix_nanos}_{uuid}.tif`.
    pub name:    String,
    pub kind:    ArtifactKind,
    /// Set by filesystem-backed stores.
    pub path:    Option<PathBuf>,
    pub created: SystemTime,
}

/// Unique artifact name; the UUID keeps concurrent writers in the same
/// nanosecond apart.
pub(crate) fn artifact_name(prefix: &str, kind: ArtifactKind, created: SystemTime) -> String {
    let nanos = created.duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    format!("{prefix}_{kind}_{nanos}_{}.tif", uuid::Uuid::new_v4().simple())
}

/// A deletion that did not happen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvictionWarning {
    pub name:  String,
    pub error: String,
}

/// Outcome of one sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvictionReport {
    /// Names of the deleted artifacts.
    pub removed:  Vec<String>,
    pub warnings: Vec<EvictionWarning>,
}

impl EvictionReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
