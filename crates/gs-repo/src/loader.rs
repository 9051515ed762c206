//! CSV loaders for sector and aggregate measurement tables.
//!
//! # CSV format
//!
//! Column names follow the measurement store.  Empty fields are missing
//! measurements (`None`).
//!
//! `pixel_sector`:
//!
//! ```csv
//! index,latitude_50,longitude_50,site_id,sector_id,geo_rsrp,geo_cqi,geo_served_demand,geo_latent_demand,geo_cap_demand,geo_churn_prob,geo_user_tput_dl,count_samples,scenario_traffic,scenario_optim,year
//! 1,40.4168,-3.7038,S1,S1_1,-85.0,10.0,10.0,0.1,0.05,0.02,9.0,40,1.0,0,2025
//! 1,40.4168,-3.7038,S2,S2_3,-95.0,7.0,5.0,,,0.03,6.5,,1.0,0,2025
//! ```
//!
//! `pixel_agg`:
//!
//! ```csv
//! index,latitude_50,longitude_50,geo_rsrp,geo_cqi,geo_user_tput_dl,geo_churn_prob,geo_served_demand,geo_latent_demand,geo_cap_demand,geo_revenue_potential,roi,npv,ttc,scenario_traffic,scenario_optim,year,best_server
//! 1,40.4168,-3.7038,-85.0,10.0,9.0,0.02,15.0,0.1,0.05,120.0,1.4,2500.0,18.0,1.0,0,2025,S1_1
//! ```
//!
//! The `best_server` column is optional.
//!
//! Competitive-benchmark tables (`csp_details_pop`, `compet_cat_pop`) have
//! an open set of metric columns, so they are read by header name rather
//! than into a fixed row struct:
//!
//! ```csv
//! Latitude,Longitude,Connection_ServiceProviderBrandName,band_category,roads_proximity,population,QOS_RSRP,dl_tput
//! 40.4168,-3.7038,Acme,LB,1,120.0,-92.0,14.5
//! ```

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use gs_core::{
    AggregateRecord, CompetitiveRecord, CompetitiveTable, PixelIndex, PixelRecord, ScenarioKey, SectorId,
    SiteId,
};

use crate::{RepoError, RepoResult};

// ── CSV rows ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SectorRow {
    index:             u64,
    latitude_50:       f64,
    longitude_50:      f64,
    site_id:           String,
    sector_id:         String,
    geo_rsrp:          Option<f64>,
    geo_cqi:           Option<f64>,
    geo_served_demand: Option<f64>,
    geo_latent_demand: Option<f64>,
    geo_cap_demand:    Option<f64>,
    geo_churn_prob:    Option<f64>,
    geo_user_tput_dl:  Option<f64>,
    count_samples:     Option<u32>,
    scenario_traffic:  f64,
    scenario_optim:    i32,
    year:              i32,
}

#[derive(Deserialize)]
struct AggregateRow {
    index:                 u64,
    latitude_50:           f64,
    longitude_50:          f64,
    geo_rsrp:              Option<f64>,
    geo_cqi:               Option<f64>,
    geo_user_tput_dl:      Option<f64>,
    geo_churn_prob:        Option<f64>,
    geo_served_demand:     Option<f64>,
    geo_latent_demand:     Option<f64>,
    geo_cap_demand:        Option<f64>,
    geo_revenue_potential: Option<f64>,
    roi:                   Option<f64>,
    npv:                   Option<f64>,
    ttc:                   Option<f64>,
    scenario_traffic:      f64,
    scenario_optim:        i32,
    year:                  i32,
    #[serde(default)]
    best_server:           Option<String>,
}

impl From<SectorRow> for PixelRecord {
    fn from(r: SectorRow) -> Self {
        PixelRecord {
            pixel_index:       PixelIndex(r.index),
            latitude:          r.latitude_50,
            longitude:         r.longitude_50,
            site_id:           SiteId::new(r.site_id),
            sector_id:         SectorId::new(r.sector_id),
            signal_level:      r.geo_rsrp,
            quality_index:     r.geo_cqi,
            served_demand:     r.geo_served_demand,
            latent_demand:     r.geo_latent_demand,
            capacity_demand:   r.geo_cap_demand,
            churn_probability: r.geo_churn_prob,
            user_throughput:   r.geo_user_tput_dl,
            sample_count:      r.count_samples,
            scenario:          ScenarioKey::new(r.scenario_traffic, r.scenario_optim, r.year),
        }
    }
}

impl From<AggregateRow> for AggregateRecord {
    fn from(r: AggregateRow) -> Self {
        AggregateRecord {
            pixel_index:        PixelIndex(r.index),
            latitude:           r.latitude_50,
            longitude:          r.longitude_50,
            signal_level:       r.geo_rsrp,
            quality_index:      r.geo_cqi,
            user_throughput:    r.geo_user_tput_dl,
            churn_probability:  r.geo_churn_prob,
            served_demand:      r.geo_served_demand,
            latent_demand:      r.geo_latent_demand,
            capacity_demand:    r.geo_cap_demand,
            revenue_potential:  r.geo_revenue_potential,
            roi:                r.roi,
            npv:                r.npv,
            time_to_congestion: r.ttc,
            best_server:        r.best_server.filter(|s| !s.is_empty()).map(SectorId::new),
            scenario:           ScenarioKey::new(r.scenario_traffic, r.scenario_optim, r.year),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load `pixel_sector` rows from a CSV file.
pub fn load_sector_records_csv(path: &Path) -> RepoResult<Vec<PixelRecord>> {
    let file = std::fs::File::open(path)?;
    load_sector_records_reader(file)
}

/// Like [`load_sector_records_csv`] but accepts any `Read` source.
pub fn load_sector_records_reader<R: Read>(reader: R) -> RepoResult<Vec<PixelRecord>> {
    load_rows::<SectorRow, PixelRecord, R>(reader)
}

/// Load `pixel_agg` rows from a CSV file.
pub fn load_aggregates_csv(path: &Path) -> RepoResult<Vec<AggregateRecord>> {
    let file = std::fs::File::open(path)?;
    load_aggregates_reader(file)
}

/// Like [`load_aggregates_csv`] but accepts any `Read` source.
pub fn load_aggregates_reader<R: Read>(reader: R) -> RepoResult<Vec<AggregateRecord>> {
    load_rows::<AggregateRow, AggregateRecord, R>(reader)
}

/// Load one competitive-benchmark table from a CSV file.
pub fn load_competitive_csv(path: &Path, table: CompetitiveTable) -> RepoResult<Vec<CompetitiveRecord>> {
    let file = std::fs::File::open(path)?;
    load_competitive_reader(file, table)
}

/// Like [`load_competitive_csv`] but accepts any `Read` source.
///
/// Columns other than the fixed ones must be numeric or empty; a
/// non-numeric cell is a parse error naming its row and column.
pub fn load_competitive_reader<R: Read>(reader: R, table: CompetitiveTable) -> RepoResult<Vec<CompetitiveRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| RepoError::Parse(format!("{table}: missing column {name}")))
    };
    let lat = column("Latitude")?;
    let lon = column("Longitude")?;
    let provider = column(table.provider_column())?;
    let band = column("band_category")?;
    let roads = column("roads_proximity")?;
    let population = column("population")?;
    let fixed = [lat, lon, provider, band, roads, population];

    let mut out = Vec::new();
    for (line, result) in csv_reader.records().enumerate() {
        let record = result?;
        let row = line + 2;
        let field = |i: usize| record.get(i).unwrap_or("");

        let mut metrics = BTreeMap::new();
        for (i, name) in headers.iter().enumerate().filter(|(i, _)| !fixed.contains(i)) {
            if let Some(v) = parse_opt::<f64>(field(i), row, name)? {
                metrics.insert(name.to_owned(), v);
            }
        }
        out.push(CompetitiveRecord {
            latitude:        parse_req(field(lat), row, "Latitude")?,
            longitude:       parse_req(field(lon), row, "Longitude")?,
            provider:        field(provider).to_owned(),
            band_category:   field(band).to_owned(),
            roads_proximity: parse_opt(field(roads), row, "roads_proximity")?.unwrap_or(0),
            population:      parse_opt(field(population), row, "population")?,
            metrics,
        });
    }
    tracing::debug!(%table, rows = out.len(), "competitive table loaded");
    Ok(out)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn load_rows<Row, T, R>(reader: R) -> RepoResult<Vec<T>>
where
    Row: for<'de> Deserialize<'de>,
    T:   From<Row>,
    R:   Read,
{
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut out = Vec::new();
    for (line, result) in csv_reader.deserialize::<Row>().enumerate() {
        // +2: one for the header, one for 1-based numbering.
        let row = result.map_err(|e| RepoError::Parse(format!("row {}: {e}", line + 2)))?;
        out.push(T::from(row));
    }
    Ok(out)
}

fn parse_opt<T: std::str::FromStr>(cell: &str, row: usize, column: &str) -> RepoResult<Option<T>> {
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse()
        .map(Some)
        .map_err(|_| RepoError::Parse(format!("row {row}: column {column}: {cell:?} is not a number")))
}

fn parse_req<T: std::str::FromStr>(cell: &str, row: usize, column: &str) -> RepoResult<T> {
    parse_opt(cell, row, column)?.ok_or_else(|| RepoError::Parse(format!("row {row}: column {column} is empty")))
}
