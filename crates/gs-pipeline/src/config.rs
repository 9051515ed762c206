//! Pipeline configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! artifact_dir    = "/var/lib/geosim/artifacts"
//! artifact_prefix = "geosim"
//! retention_hours = 6.0
//! workspace       = "geosim"
//! legend_entries  = 6
//! image_format    = "rgba"
//!
//! [grid]
//! pixel_cell_m       = 56.0
//! competitive_cell_m = 315.0
//! meters_per_degree  = 111000.0
//! epsg               = 4326
//!
//! [retry]
//! max_retries    = 3
//! retry_delay_ms = 100
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use gs_raster::{GridSpec, SpatialRef, METERS_PER_DEGREE};
use serde::{Deserialize, Serialize};

use crate::{PipelineError, PipelineResult, RetryPolicy};

/// Which colorized image is stored and published next to the value raster.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Rgb,
    #[default]
    Rgba,
}

/// Grid resolutions of the two map families.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Sector, coverage and switch-off maps.
    pub pixel_cell_m:       f64,
    /// Competitive-benchmark maps.
    pub competitive_cell_m: f64,
    pub meters_per_degree:  f64,
    pub epsg:               u16,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            pixel_cell_m:       56.0,
            competitive_cell_m: 315.0,
            meters_per_degree:  METERS_PER_DEGREE,
            epsg:               4326,
        }
    }
}

impl GridConfig {
    fn spatial_ref(&self) -> SpatialRef {
        if self.epsg == SpatialRef::WGS84.epsg { SpatialRef::WGS84 } else { SpatialRef::projected(self.epsg) }
    }

    fn spec(&self, cell_size_m: f64, no_data: f64) -> GridSpec {
        GridSpec {
            cell_size_m,
            meters_per_degree: self.meters_per_degree,
            no_data,
            spatial_ref: self.spatial_ref(),
        }
    }

    pub fn grid_spec(&self, resolution: Resolution, no_data: f64) -> GridSpec {
        match resolution {
            Resolution::Pixel       => self.spec(self.pixel_cell_m, no_data),
            Resolution::Competitive => self.spec(self.competitive_cell_m, no_data),
        }
    }
}

/// Grid family of a map request.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    #[default]
    Pixel,
    Competitive,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub artifact_dir:    PathBuf,
    /// Name prefix of every artifact; eviction only touches these files.
    pub artifact_prefix: String,
    pub retention_hours: f64,
    /// Publisher workspace the map layers are registered in.
    pub workspace:       String,
    pub legend_entries:  usize,
    /// Trim fraction for the map-centre estimate.
    pub center_trim:     f64,
    pub image_format:    ImageFormat,
    pub grid:            GridConfig,
    pub retry:           RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            artifact_dir:    PathBuf::from("artifacts"),
            artifact_prefix: "geosim".to_owned(),
            retention_hours: 6.0,
            workspace:       "geosim".to_owned(),
            legend_entries:  gs_render::DEFAULT_LEGEND_ENTRIES,
            center_trim:     0.02,
            image_format:    ImageFormat::default(),
            grid:            GridConfig::default(),
            retry:           RetryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> PipelineResult<Self> {
        let config: PipelineConfig = toml::from_str(s)
            .map_err(|e| PipelineError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PipelineError::Config(format!("failed to read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(PipelineError::Config(format!("{name} must be positive, got {v}")))
            }
        };
        positive("retention_hours", self.retention_hours)?;
        positive("grid.pixel_cell_m", self.grid.pixel_cell_m)?;
        positive("grid.competitive_cell_m", self.grid.competitive_cell_m)?;
        positive("grid.meters_per_degree", self.grid.meters_per_degree)?;
        if !(0.0..0.5).contains(&self.center_trim) {
            return Err(PipelineError::Config(format!("center_trim must be in [0, 0.5), got {}", self.center_trim)));
        }
        if self.artifact_prefix.is_empty() {
            return Err(PipelineError::Config("artifact_prefix must not be empty".to_owned()));
        }
        Ok(())
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs_f64(self.retention_hours * 3600.0)
    }
}
