//! metro — switch-off and coverage maps for a small synthetic metro network.
//!
//! Loads the sector and aggregate measurement tables from CSV, runs one map
//! request through the pipeline, writes the artifacts under the configured
//! directory, and prints a JSON summary (artifact paths, bounds, centre,
//! legend) on stdout.  Logs go to stderr; set `RUST_LOG=debug` for stage
//! detail.
//!
//! ```text
//! cargo run -p metro -- switch-off --sites MAD001
//! cargo run -p metro -- coverage --kpi geo_rsrp --competitive
//! cargo run -p metro -- site --site MAD004 --kpi geo_churn_prob
//! cargo run -p metro -- benchmark --provider Metrotel --metric dl_tput --vmin 0 --vmax 40
//! cargo run -p metro -- best-server
//! cargo run -p metro -- legend --tab "Coverage Quality"
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use gs_core::{
    BaselineQuery, ColorScaleId, CompetitiveQuery, CompetitiveSource, CompetitiveTable, KpiKind, MetricColumn,
    ScenarioKey, SectorId, SectorQuery, SectorSelection, SiteId, SiteSet, ValueRange,
};
use gs_pipeline::{
    BestServerMapRequest, CompetitiveMapRequest, CoverageRequest, MapOutput, MapPipelineBuilder, PipelineConfig,
    PipelineObserver, PublishError, Publisher, Resolution, RetryingRepository, SectorMapRequest, Stage,
    SwitchOffRequest,
};
use gs_render::ColorLegend;
use gs_repo::{load_aggregates_csv, load_competitive_csv, load_sector_records_csv, MemoryRepository};
use gs_store::{ArtifactHandle, EvictionReport, FsArtifactStore};

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "metro", about = "Coverage switch-off maps from CSV measurements")]
struct Args {
    /// Pipeline configuration (TOML).  Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-sector measurement table.
    #[arg(long, default_value = "demos/metro/data/pixel_sector.csv")]
    sectors: PathBuf,

    /// Per-pixel aggregate table.
    #[arg(long, default_value = "demos/metro/data/pixel_agg.csv")]
    aggregates: PathBuf,

    /// Competitive benchmark, per-measurement detail table.
    #[arg(long, default_value = "demos/metro/data/csp_details_pop.csv")]
    benchmark_detail: PathBuf,

    /// Competitive benchmark, per-category table.  Optional.
    #[arg(long)]
    benchmark_category: Option<PathBuf>,

    #[arg(long, default_value_t = 1.0)]
    traffic: f64,

    #[arg(long, default_value_t = 0)]
    optim: i32,

    #[arg(long, default_value_t = 2025)]
    year: i32,

    /// Lower RSRP bound (dBm).
    #[arg(long, allow_hyphen_values = true)]
    signal_min: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    signal_max: Option<f64>,

    /// Lower CQI bound.
    #[arg(long)]
    quality_min: Option<f64>,

    #[arg(long)]
    quality_max: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// KPI map after switching off one or more sites.
    SwitchOff {
        #[arg(long, value_delimiter = ',', required = true)]
        sites: Vec<String>,
        /// Measurement column, e.g. `geo_user_tput_dl`.
        #[arg(long, default_value = "geo_user_tput_dl")]
        kpi: String,
    },
    /// Baseline KPI map.
    Coverage {
        #[arg(long, default_value = "geo_rsrp")]
        kpi: String,
        /// Use the coarse competitive-benchmark grid.
        #[arg(long)]
        competitive: bool,
    },
    /// KPI map of every sector of one site.
    Site {
        #[arg(long)]
        site: String,
        #[arg(long, default_value = "geo_user_tput_dl")]
        kpi: String,
    },
    /// KPI map of selected sectors.
    Sectors {
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<String>,
        #[arg(long, default_value = "geo_user_tput_dl")]
        kpi: String,
    },
    /// Competitive-benchmark map of one provider.
    Benchmark {
        #[arg(long)]
        provider: String,
        #[arg(long, default_value = "LB")]
        band: String,
        /// Benchmark column, e.g. `QOS_RSRP`.
        #[arg(long, default_value = "QOS_RSRP")]
        metric: String,
        /// Road-proximity class; 0 accepts every class.
        #[arg(long, default_value_t = 0)]
        roads: i32,
        /// Read the per-category table; `--signal-min/max` then bound the metric itself.
        #[arg(long)]
        category: bool,
        #[arg(long, default_value = "RdYlGn")]
        scale: String,
        #[arg(long, allow_hyphen_values = true, default_value_t = -115.0)]
        vmin: f64,
        #[arg(long, allow_hyphen_values = true, default_value_t = -60.0)]
        vmax: f64,
    },
    /// Best-serving sector of every pixel.
    BestServer,
    /// Legend only, by dashboard tab or by scale and range.
    Legend {
        #[arg(long)]
        tab: Option<String>,
        #[arg(long)]
        scale: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        vmin: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        vmax: Option<f64>,
    },
}

impl Args {
    fn scenario(&self) -> ScenarioKey {
        ScenarioKey::new(self.traffic, self.optim, self.year)
    }

    fn query(&self, kpi: &str) -> Result<BaselineQuery> {
        let kpi: KpiKind = kpi.parse()?;
        Ok(BaselineQuery::new(kpi, self.scenario())
            .signal_range(range(self.signal_min, self.signal_max)?)
            .quality_range(range(self.quality_min, self.quality_max)?))
    }
}

fn range(min: Option<f64>, max: Option<f64>) -> Result<ValueRange> {
    Ok(ValueRange::new(min.unwrap_or(f64::MIN), max.unwrap_or(f64::MAX))?)
}

// ── Collaborators ─────────────────────────────────────────────────────────────

/// Stands in for the map server: logs what would be registered.
struct LogPublisher;

impl Publisher for LogPublisher {
    fn publish(&self, layer: &str, artifact: &ArtifactHandle, workspace: &str) -> Result<(), PublishError> {
        info!(layer, workspace, artifact = %artifact.name, "layer ready to publish");
        Ok(())
    }
}

#[derive(Default)]
struct TimingObserver {
    stages:  Vec<(Stage, Duration)>,
    evicted: usize,
}

impl PipelineObserver for TimingObserver {
    fn on_stage_end(&mut self, stage: Stage, elapsed: Duration) {
        self.stages.push((stage, elapsed));
    }

    fn on_eviction(&mut self, report: &EvictionReport) {
        self.evicted += report.removed.len();
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

fn legend_json(legend: &ColorLegend) -> Value {
    Value::Array(
        legend
            .entries
            .iter()
            .map(|e| json!({ "label": e.label, "hex": e.hex() }))
            .collect(),
    )
}

fn summary(out: &MapOutput, timing: &TimingObserver) -> Value {
    let stages: serde_json::Map<String, Value> = timing
        .stages
        .iter()
        .map(|(stage, d)| (stage.to_string(), json!(d.as_secs_f64() * 1e3)))
        .collect();
    json!({
        "layer":       out.layer,
        "metric":      out.metric,
        "title":       out.title,
        "raster":      out.raster.path,
        "image":       out.image.path,
        "bounds":      out.bounds,
        "corners":     out.bounds.corners_lat_lon(),
        "center":      out.center,
        "valid_cells": out.valid_cells,
        "switch_off":  out.switch_off.map(|s| json!({
            "affected_pixels": s.affected_pixels,
            "coverage_loss":   s.coverage_loss,
        })),
        "evicted":     timing.evicted,
        "warnings":    out.eviction.warnings.iter().map(|w| format!("{}: {}", w.name, w.error)).collect::<Vec<_>>(),
        "published":   out.published,
        "legend":      legend_json(&out.legend),
        "stages_ms":   stages,
    })
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let args = Args::parse();

    // 1. Configuration.
    let config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    // 2. Measurements.  Transient read failures are retried per the config;
    //    the pipeline itself never retries.
    let sectors = config
        .retry
        .run("load sectors", || load_sector_records_csv(&args.sectors))
        .with_context(|| format!("loading {}", args.sectors.display()))?;
    let aggregates = config
        .retry
        .run("load aggregates", || load_aggregates_csv(&args.aggregates))
        .with_context(|| format!("loading {}", args.aggregates.display()))?;
    info!(sectors = sectors.len(), aggregates = aggregates.len(), "measurements loaded");
    let mut memory = MemoryRepository::new(sectors, aggregates);
    let benchmarks = [
        (CompetitiveTable::Detail, Some(&args.benchmark_detail)),
        (CompetitiveTable::Category, args.benchmark_category.as_ref()),
    ];
    for (table, path) in benchmarks {
        let Some(path) = path else { continue };
        let rows = config
            .retry
            .run("load benchmark", || load_competitive_csv(path, table))
            .with_context(|| format!("loading {}", path.display()))?;
        info!(%table, rows = rows.len(), "benchmark loaded");
        memory = memory.with_competitive(table, rows);
    }
    let repo = RetryingRepository::new(memory, config.retry);

    // 3. Artifact store and pipeline.
    let store = Arc::new(
        FsArtifactStore::new(&config.artifact_dir, &config.artifact_prefix)
            .with_context(|| format!("opening {}", config.artifact_dir.display()))?,
    );
    let pipeline = MapPipelineBuilder::new(repo, store)
        .publisher(LogPublisher)
        .config(config)
        .build()?;

    // 4. One request.
    let mut timing = TimingObserver::default();
    let out = match &args.command {
        Command::SwitchOff { sites, kpi } => {
            let sites: SiteSet = sites.iter().map(|s| SiteId::new(s.trim())).collect();
            let req = SwitchOffRequest {
                layer: format!("switch_off_{}", kpi),
                query: args.query(kpi)?,
                sites,
            };
            pipeline.switch_off_map(&req, &mut timing)?
        }
        Command::Coverage { kpi, competitive } => {
            let resolution = if *competitive { Resolution::Competitive } else { Resolution::Pixel };
            let req = CoverageRequest { layer: format!("coverage_{kpi}"), query: args.query(kpi)?, resolution };
            pipeline.coverage_map(&req, &mut timing)?
        }
        Command::Site { site, kpi } => {
            let req = SectorMapRequest {
                layer: format!("site_{site}_{kpi}"),
                query: SectorQuery {
                    baseline:  args.query(kpi)?,
                    selection: SectorSelection::Site(SiteId::new(site.as_str())),
                },
            };
            pipeline.sector_map(&req, &mut timing)?
        }
        Command::Sectors { ids, kpi } => {
            let req = SectorMapRequest {
                layer: format!("sectors_{kpi}"),
                query: SectorQuery {
                    baseline:  args.query(kpi)?,
                    selection: SectorSelection::Sectors(ids.iter().map(|s| SectorId::new(s.trim())).collect()),
                },
            };
            pipeline.sector_map(&req, &mut timing)?
        }
        Command::Benchmark { provider, band, metric, roads, category, scale, vmin, vmax } => {
            let bounds = range(args.signal_min, args.signal_max)?;
            let source = if *category {
                CompetitiveSource::Category { value_range: bounds }
            } else {
                CompetitiveSource::Detail { signal_range: bounds }
            };
            let query = CompetitiveQuery::new(provider.as_str(), band.as_str(), MetricColumn::new(metric)?, source)
                .roads_proximity(*roads);
            let req = CompetitiveMapRequest {
                layer: format!("compet_{provider}_{metric}"),
                query,
                scale: scale.parse::<ColorScaleId>()?,
                vmin: *vmin,
                vmax: *vmax,
            };
            pipeline.competitive_map(&req, &mut timing)?
        }
        Command::BestServer => {
            let req = BestServerMapRequest { layer: "best_server".to_owned(), scenario: args.scenario() };
            let best = pipeline.best_server_map(&req, &mut timing)?;
            info!(servers = best.servers.len(), "best servers numbered");
            best.map
        }
        Command::Legend { tab, scale, vmin, vmax } => {
            let legend = match (tab, scale, vmin, vmax) {
                (Some(tab), None, _, _) => pipeline.legend_for_tab(tab)?,
                (None, Some(scale), Some(vmin), Some(vmax)) => pipeline.legend_for_scale(scale, *vmin, *vmax)?,
                _ => bail!("legend needs either --tab, or --scale with --vmin and --vmax"),
            };
            println!("{}", serde_json::to_string_pretty(&legend_json(&legend))?);
            return Ok(());
        }
    };

    println!("{}", serde_json::to_string_pretty(&summary(&out, &timing))?);
    Ok(())
}
