//! Map requests and their outputs.

use std::sync::Arc;

use gs_core::{
    BaselineQuery, BoundingBox, ColorScaleId, CompetitiveQuery, GeoPoint, ScenarioKey, SectorId, SectorQuery, SiteSet,
};
use gs_render::ColorLegend;
use gs_store::{ArtifactHandle, EvictionReport};

use crate::Resolution;

/// KPI surface after switching off `sites`.
#[derive(Clone, Debug)]
pub struct SwitchOffRequest {
    /// Layer name handed to the publisher.
    pub layer: String,
    pub query: BaselineQuery,
    pub sites: SiteSet,
}

/// Baseline KPI surface, at pixel or competitive resolution.
#[derive(Clone, Debug)]
pub struct CoverageRequest {
    pub layer:      String,
    pub query:      BaselineQuery,
    pub resolution: Resolution,
}

/// Per-sector KPI surface of selected sectors or of one site.
#[derive(Clone, Debug)]
pub struct SectorMapRequest {
    pub layer: String,
    pub query: SectorQuery,
}

/// Competitive-benchmark surface of one provider.
///
/// Always drawn on the coarse grid; cells without a sample, or whose value
/// is zero, are transparent.
#[derive(Clone, Debug)]
pub struct CompetitiveMapRequest {
    pub layer: String,
    pub query: CompetitiveQuery,
    pub scale: ColorScaleId,
    pub vmin:  f64,
    pub vmax:  f64,
}

/// Best-serving sector of every pixel of one scenario.
#[derive(Clone, Debug)]
pub struct BestServerMapRequest {
    pub layer:    String,
    pub scenario: ScenarioKey,
}

/// Switch-off figures attached to a [`MapOutput`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SwitchOffSummary {
    /// Pixels served by at least one removed site.
    pub affected_pixels: usize,
    /// Affected pixels left without any serving sector.
    pub coverage_loss:   usize,
}

/// Everything one map request produced.
#[derive(Clone, Debug)]
pub struct MapOutput {
    pub layer:       String,
    /// Column the values come from, e.g. `geo_rsrp`.
    pub metric:      String,
    pub title:       String,
    /// Single-band `f32` value raster.
    pub raster:      ArtifactHandle,
    /// Colorized RGB or RGBA image, the published artifact.
    pub image:       ArtifactHandle,
    pub legend:      Arc<ColorLegend>,
    pub bounds:      BoundingBox,
    /// Centre of the densest part of the samples.
    pub center:      Option<GeoPoint>,
    pub valid_cells: usize,
    pub switch_off:  Option<SwitchOffSummary>,
    pub eviction:    EvictionReport,
    /// `false` if the publisher reported an error.
    pub published:   bool,
}

/// A best-server map and its sector numbering.
#[derive(Clone, Debug)]
pub struct BestServerMap {
    pub map:     MapOutput,
    /// `servers[i]` is drawn with value `i + 1`.
    pub servers: Vec<SectorId>,
}
