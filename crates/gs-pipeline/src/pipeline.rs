//! The map pipeline: fetch → simulate → rasterize → colorize → store → publish.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use gs_core::{ColorScaleId, CompetitiveSample, GeoPoint, GeoSample, KpiKind, SectorId};
use gs_raster::{density_center, rasterize, write_geotiff};
use gs_render::{
    colorize, encode_rgb_geotiff, encode_rgba_geotiff, ColorLegend, ColorScale, ColorizeOptions, LegendCache,
};
use gs_repo::MeasurementRepository;
use gs_sim::simulate;
use gs_store::{ArtifactHandle, ArtifactKind, ArtifactStore};

use crate::{
    BestServerMap, BestServerMapRequest, CompetitiveMapRequest, CoverageRequest, ImageFormat, MapOutput,
    NoopPublisher, PipelineConfig, PipelineError, PipelineObserver, PipelineResult, Publisher, Resolution,
    SectorMapRequest, Stage, SwitchOffRequest, SwitchOffSummary,
};

/// What a map shows and how it is colored.
struct Look {
    metric: String,
    title:  String,
    colors: ColorizeOptions,
}

impl Look {
    fn kpi(kpi: KpiKind) -> Self {
        let profile = kpi.profile();
        Self {
            metric: kpi.column().to_owned(),
            title:  profile.legend_title.to_owned(),
            colors: ColorizeOptions::from_profile(&profile),
        }
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Fluent builder for [`MapPipeline<R>`].
///
/// | Method          | Default                      |
/// |-----------------|------------------------------|
/// | `.publisher(p)` | [`NoopPublisher`]            |
/// | `.config(c)`    | `PipelineConfig::default()`  |
///
/// ```rust,ignore
/// let store = Arc::new(FsArtifactStore::new(&config.artifact_dir, &config.artifact_prefix)?);
/// let pipeline = MapPipelineBuilder::new(repo, store)
///     .config(config)
///     .build()?;
/// let out = pipeline.switch_off_map(&request, &mut NoopObserver)?;
/// ```
pub struct MapPipelineBuilder<R: MeasurementRepository> {
    repo:      R,
    store:     Arc<dyn ArtifactStore>,
    publisher: Option<Box<dyn Publisher>>,
    config:    Option<PipelineConfig>,
}

impl<R: MeasurementRepository> MapPipelineBuilder<R> {
    pub fn new(repo: R, store: Arc<dyn ArtifactStore>) -> Self {
        Self { repo, store, publisher: None, config: None }
    }

    pub fn publisher(mut self, publisher: impl Publisher + 'static) -> Self {
        self.publisher = Some(Box::new(publisher));
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate the configuration and return a ready pipeline.
    pub fn build(self) -> PipelineResult<MapPipeline<R>> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(MapPipeline {
            repo:      self.repo,
            store:     self.store,
            publisher: self.publisher.unwrap_or_else(|| Box::new(NoopPublisher)),
            config,
            legends:   LegendCache::new(),
        })
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Serves map requests against one repository and one artifact store.
///
/// Requests are independent; the pipeline can be shared by reference across
/// threads.  The only state shared between requests is the artifact store
/// and the legend cache.
pub struct MapPipeline<R: MeasurementRepository> {
    repo:      R,
    store:     Arc<dyn ArtifactStore>,
    publisher: Box<dyn Publisher>,
    config:    PipelineConfig,
    legends:   LegendCache,
}

impl<R: MeasurementRepository> MapPipeline<R> {
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// KPI surface after the sites in `req.sites` go off air.
    pub fn switch_off_map<O: PipelineObserver>(
        &self,
        req: &SwitchOffRequest,
        obs: &mut O,
    ) -> PipelineResult<MapOutput> {
        let kpi = req.query.kpi;
        let span = tracing::info_span!("switch_off_map", layer = %req.layer, %kpi, sites = %req.sites);
        let _enter = span.enter();

        let (records, baseline) = run_stage(obs, Stage::Fetch, || {
            let records = self.repo.switch_off_records(&req.query.scenario, &req.sites)?;
            let baseline = self.repo.baseline(&req.query)?;
            Ok((records, baseline))
        })?;

        let (samples, summary) = run_stage(obs, Stage::Simulate, || {
            let outcome = simulate(&records, &baseline, &req.sites, kpi);
            let summary = SwitchOffSummary {
                affected_pixels: outcome.aggregates.len(),
                coverage_loss:   outcome.aggregates.coverage_loss_count(),
            };
            Ok((outcome.samples(), summary))
        })?;

        self.render(&req.layer, Look::kpi(kpi), &samples, Resolution::Pixel, Some(summary), obs)
    }

    /// Baseline KPI surface.
    pub fn coverage_map<O: PipelineObserver>(
        &self,
        req: &CoverageRequest,
        obs: &mut O,
    ) -> PipelineResult<MapOutput> {
        let kpi = req.query.kpi;
        let span = tracing::info_span!("coverage_map", layer = %req.layer, %kpi);
        let _enter = span.enter();

        let samples = run_stage(obs, Stage::Fetch, || {
            let baseline = self.repo.baseline(&req.query)?;
            Ok(baseline.iter().map(|b| b.sample()).collect::<Vec<_>>())
        })?;

        self.render(&req.layer, Look::kpi(kpi), &samples, req.resolution, None, obs)
    }

    /// Per-sector KPI surface of the selected sectors or site.
    pub fn sector_map<O: PipelineObserver>(
        &self,
        req: &SectorMapRequest,
        obs: &mut O,
    ) -> PipelineResult<MapOutput> {
        let kpi = req.query.baseline.kpi;
        let span = tracing::info_span!("sector_map", layer = %req.layer, %kpi);
        let _enter = span.enter();

        let samples = run_stage(obs, Stage::Fetch, || Ok(self.repo.sector_samples(&req.query)?))?;

        self.render(&req.layer, Look::kpi(kpi), &samples, Resolution::Pixel, None, obs)
    }

    /// Competitive-benchmark surface of one provider, on the coarse grid.
    pub fn competitive_map<O: PipelineObserver>(
        &self,
        req: &CompetitiveMapRequest,
        obs: &mut O,
    ) -> PipelineResult<MapOutput> {
        let q = &req.query;
        let span = tracing::info_span!(
            "competitive_map",
            layer = %req.layer,
            metric = %q.metric,
            provider = %q.provider,
            table = %q.source.table()
        );
        let _enter = span.enter();

        let samples = run_stage(obs, Stage::Fetch, || {
            let rows = self.repo.competitive_samples(q)?;
            Ok(rows.iter().map(CompetitiveSample::sample).collect::<Vec<_>>())
        })?;

        let look = Look {
            metric: q.metric.to_string(),
            title:  format!("{} {}", q.provider, q.metric),
            colors: ColorizeOptions::new(req.vmin, req.vmax, req.scale),
        };
        self.render(&req.layer, look, &samples, Resolution::Competitive, None, obs)
    }

    /// Best-serving sector of every pixel.  Sectors are numbered `1..=n` in
    /// code order and drawn on a diverging scale.
    pub fn best_server_map<O: PipelineObserver>(
        &self,
        req: &BestServerMapRequest,
        obs: &mut O,
    ) -> PipelineResult<BestServerMap> {
        let span = tracing::info_span!("best_server_map", layer = %req.layer);
        let _enter = span.enter();

        let (samples, servers) = run_stage(obs, Stage::Fetch, || {
            let rows = self.repo.best_server_samples(&req.scenario)?;
            let servers: Vec<SectorId> =
                rows.iter().map(|r| r.sector.clone()).collect::<BTreeSet<_>>().into_iter().collect();
            let samples: Vec<GeoSample> = {
                let codes: BTreeMap<&SectorId, f64> =
                    servers.iter().zip(1u32..).map(|(s, i)| (s, f64::from(i))).collect();
                rows.iter()
                    .map(|r| GeoSample::new(r.longitude, r.latitude, codes.get(&r.sector).copied()))
                    .collect()
            };
            Ok((samples, servers))
        })?;

        // One server still needs a non-empty range.
        let vmax = servers.len().max(2) as f64;
        let look = Look {
            metric: "best_server".to_owned(),
            title:  "Best Server".to_owned(),
            colors: ColorizeOptions::new(1.0, vmax, ColorScaleId::Coolwarm),
        };
        let map = self.render(&req.layer, look, &samples, Resolution::Pixel, None, obs)?;
        Ok(BestServerMap { map, servers })
    }

    // ── Legends ───────────────────────────────────────────────────────────

    /// Legend of a KPI's default profile.
    pub fn legend(&self, kpi: KpiKind) -> PipelineResult<Arc<ColorLegend>> {
        let p = kpi.profile();
        Ok(self.legends.get_or_build(ColorScale::new(p.scale), p.vmin, p.vmax, self.config.legend_entries)?)
    }

    /// Legend for a dashboard tab name such as `"Coverage Signal Level"`.
    pub fn legend_for_tab(&self, tab: &str) -> PipelineResult<Arc<ColorLegend>> {
        self.legend(KpiKind::from_selection_tab(tab)?)
    }

    /// Legend for an explicit scale name and range.
    pub fn legend_for_scale(&self, scale: &str, vmin: f64, vmax: f64) -> PipelineResult<Arc<ColorLegend>> {
        let scale = ColorScale::by_name(scale)?;
        Ok(self.legends.get_or_build(scale, vmin, vmax, self.config.legend_entries)?)
    }

    // ── Shared tail ───────────────────────────────────────────────────────

    fn render<O: PipelineObserver>(
        &self,
        layer:      &str,
        look:       Look,
        samples:    &[GeoSample],
        resolution: Resolution,
        switch_off: Option<SwitchOffSummary>,
        obs:        &mut O,
    ) -> PipelineResult<MapOutput> {
        let spec = self.config.grid.grid_spec(resolution, look.colors.no_data);

        let (grid, raster_bytes) = run_stage(obs, Stage::Rasterize, || {
            let grid = rasterize(samples, &spec)?;
            let bytes = write_geotiff(&grid)?;
            Ok((grid, bytes))
        })?;

        let opts = look.colors.with_legend_entries(self.config.legend_entries);
        let (image_kind, image_bytes, legend) = run_stage(obs, Stage::Colorize, || {
            let img = colorize(&grid, &opts)?;
            let (kind, bytes) = match self.config.image_format {
                ImageFormat::Rgb  => (ArtifactKind::RgbImage, encode_rgb_geotiff(&img)?),
                ImageFormat::Rgba => (ArtifactKind::RgbaImage, encode_rgba_geotiff(&img)?),
            };
            let legend = self.legends.get_or_build(opts.scale, opts.vmin, opts.vmax, opts.legend_entries)?;
            Ok((kind, bytes, legend))
        })?;

        let (raster, image, eviction) = run_stage(obs, Stage::Store, || {
            let (raster, eviction) =
                self.store.put_after_sweep(self.config.retention(), ArtifactKind::Raster, &raster_bytes)?;
            let image = match self.store.put(image_kind, &image_bytes) {
                Ok(image) => image,
                Err(e) => {
                    // A failed request leaves nothing behind.
                    if let Err(cleanup) = self.store.delete(&raster) {
                        tracing::warn!(artifact = %raster.name, error = %cleanup, "could not remove orphaned raster");
                    }
                    return Err(e.into());
                }
            };
            Ok((raster, image, eviction))
        })?;
        obs.on_eviction(&eviction);
        obs.on_artifact(&raster);
        obs.on_artifact(&image);

        let published = run_stage(obs, Stage::Publish, || Ok(self.publish(layer, &image)))?;

        let center = density_center(
            samples
                .iter()
                .filter(|s| s.value.is_some_and(f64::is_finite))
                .map(|s| GeoPoint::new(s.lat, s.lon)),
            self.config.center_trim,
        );

        tracing::info!(
            layer,
            metric = %look.metric,
            cols = grid.cols,
            rows = grid.rows,
            valid = grid.valid_count(),
            image = %image.name,
            published,
            "map rendered"
        );

        Ok(MapOutput {
            layer: layer.to_owned(),
            metric: look.metric,
            title: look.title,
            raster,
            image,
            legend,
            bounds: grid.bounds(),
            center,
            valid_cells: grid.valid_count(),
            switch_off,
            eviction,
            published,
        })
    }

    fn publish(&self, layer: &str, image: &ArtifactHandle) -> bool {
        match self.publisher.publish(layer, image, &self.config.workspace) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(layer, error = %e, "publishing failed");
                false
            }
        }
    }
}

/// Run one stage inside a tracing span, reporting it to the observer.
fn run_stage<T, O, F>(obs: &mut O, stage: Stage, f: F) -> PipelineResult<T>
where
    O: PipelineObserver,
    F: FnOnce() -> PipelineResult<T>,
{
    let span = tracing::debug_span!("stage", stage = stage.as_str());
    let _enter = span.enter();
    obs.on_stage_start(stage);
    let start = Instant::now();
    let out = f().inspect_err(|e: &PipelineError| tracing::debug!(%stage, error = %e, "stage failed"))?;
    obs.on_stage_end(stage, start.elapsed());
    Ok(out)
}
