//! SQLite repository (feature `sqlite`).
//!
//! Reads the `pixel_sector` and `pixel_agg` tables, and the
//! `csp_details_pop` and `compet_cat_pop` benchmark tables, of an existing
//! database.
//! Every call opens its own read-only connection and drops it on return, so
//! no connection outlives a query, even on error paths.

use std::path::{Path, PathBuf};

use rusqlite::types::{ToSql, ValueRef};
use rusqlite::{Connection, OpenFlags, Row};

use gs_core::scenario::TRAFFIC_SCENARIO_TOLERANCE;
use gs_core::{
    BaselinePixel, BaselineQuery, BestServerSample, CompetitiveQuery, CompetitiveSample, CompetitiveSource,
    GeoSample, PixelIndex, PixelRecord, ScenarioKey, SectorId, SectorQuery, SectorSelection, SiteId, SiteSet,
};

use crate::{MeasurementRepository, RepoError, RepoResult};

const SECTOR_COLUMNS: &str = "ps.\"index\", ps.latitude_50, ps.longitude_50, ps.site_id, \
     ps.sector_id, ps.geo_rsrp, ps.geo_cqi, ps.geo_served_demand, ps.geo_latent_demand, \
     ps.geo_cap_demand, ps.geo_churn_prob, ps.geo_user_tput_dl, ps.count_samples, \
     ps.scenario_traffic, ps.scenario_optim, ps.year";

/// Read-only repository over a SQLite file.
#[derive(Clone, Debug)]
pub struct SqliteRepository {
    path: PathBuf,
}

impl SqliteRepository {
    /// Verifies the database can be opened; does not keep the connection.
    pub fn open(path: &Path) -> RepoResult<Self> {
        let repo = Self { path: path.to_path_buf() };
        drop(repo.connect()?);
        Ok(repo)
    }

    fn connect(&self) -> RepoResult<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Ok(Connection::open_with_flags(&self.path, flags)?)
    }
}

fn placeholders(start: usize, count: usize) -> String {
    (start..start + count).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ")
}

fn sector_row(row: &Row<'_>) -> rusqlite::Result<PixelRecord> {
    let index: i64 = row.get(0)?;
    Ok(PixelRecord {
        pixel_index:       PixelIndex(index as u64),
        latitude:          row.get(1)?,
        longitude:         row.get(2)?,
        site_id:           SiteId::new(row.get::<_, String>(3)?),
        sector_id:         SectorId::new(row.get::<_, String>(4)?),
        signal_level:      row.get(5)?,
        quality_index:     row.get(6)?,
        served_demand:     row.get(7)?,
        latent_demand:     row.get(8)?,
        capacity_demand:   row.get(9)?,
        churn_probability: row.get(10)?,
        user_throughput:   row.get(11)?,
        sample_count:      row.get(12)?,
        scenario:          ScenarioKey::new(row.get(13)?, row.get(14)?, row.get(15)?),
    })
}

impl MeasurementRepository for SqliteRepository {
    fn switch_off_records(
        &self,
        scenario: &ScenarioKey,
        sites:    &SiteSet,
    ) -> RepoResult<Vec<PixelRecord>> {
        if sites.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {SECTOR_COLUMNS}
             FROM pixel_sector ps
             WHERE ABS(ps.scenario_traffic - ?1) < ?2
               AND ps.scenario_optim = ?3
               AND ps.year = ?4
               AND ps.\"index\" IN (
                   SELECT DISTINCT \"index\" FROM pixel_sector
                   WHERE site_id IN ({sites})
                     AND ABS(scenario_traffic - ?1) < ?2
                     AND scenario_optim = ?3
                     AND year = ?4)",
            sites = placeholders(5, sites.len()),
        );

        let site_codes: Vec<&str> = sites.iter().map(SiteId::as_str).collect();
        let mut params: Vec<&dyn ToSql> = vec![
            &scenario.traffic_scenario,
            &TRAFFIC_SCENARIO_TOLERANCE,
            &scenario.optimization_scenario,
            &scenario.year,
        ];
        params.extend(site_codes.iter().map(|s| s as &dyn ToSql));

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(&params[..], sector_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(sites = %sites, records = records.len(), "switch-off records fetched");
        Ok(records)
    }

    fn baseline(&self, query: &BaselineQuery) -> RepoResult<Vec<BaselinePixel>> {
        // The column name comes from a closed enum, never from user text.
        let sql = format!(
            "SELECT \"index\", latitude_50, longitude_50, geo_rsrp, geo_cqi, {kpi}
             FROM pixel_agg
             WHERE ABS(scenario_traffic - ?1) < ?2
               AND scenario_optim = ?3
               AND year = ?4
               AND geo_rsrp BETWEEN ?5 AND ?6
               AND geo_cqi BETWEEN ?7 AND ?8",
            kpi = query.kpi.column(),
        );
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                rusqlite::params![
                    query.scenario.traffic_scenario,
                    TRAFFIC_SCENARIO_TOLERANCE,
                    query.scenario.optimization_scenario,
                    query.scenario.year,
                    query.signal_range.min,
                    query.signal_range.max,
                    query.quality_range.min,
                    query.quality_range.max,
                ],
                |row| {
                    let index: i64 = row.get(0)?;
                    Ok(BaselinePixel {
                        pixel_index:   PixelIndex(index as u64),
                        latitude:      row.get(1)?,
                        longitude:     row.get(2)?,
                        signal_level:  row.get(3)?,
                        quality_index: row.get(4)?,
                        value:         row.get(5)?,
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn sector_samples(&self, query: &SectorQuery) -> RepoResult<Vec<GeoSample>> {
        let base = &query.baseline;
        if !base.kpi.in_sector_table() {
            return Err(RepoError::NotPerSector(base.kpi));
        }

        let (filter, codes): (String, Vec<&str>) = match &query.selection {
            SectorSelection::Sectors(ids) if ids.is_empty() => return Ok(Vec::new()),
            SectorSelection::Sectors(ids) => (
                format!("sector_id IN ({})", placeholders(9, ids.len())),
                ids.iter().map(SectorId::as_str).collect(),
            ),
            SectorSelection::Site(id) => ("site_id = ?9".to_owned(), vec![id.as_str()]),
        };
        let sql = format!(
            "SELECT longitude_50, latitude_50, {kpi}
             FROM pixel_sector
             WHERE ABS(scenario_traffic - ?1) < ?2
               AND scenario_optim = ?3
               AND year = ?4
               AND geo_rsrp BETWEEN ?5 AND ?6
               AND geo_cqi BETWEEN ?7 AND ?8
               AND {filter}",
            kpi = base.kpi.column(),
        );

        let mut params: Vec<&dyn ToSql> = vec![
            &base.scenario.traffic_scenario,
            &TRAFFIC_SCENARIO_TOLERANCE,
            &base.scenario.optimization_scenario,
            &base.scenario.year,
            &base.signal_range.min,
            &base.signal_range.max,
            &base.quality_range.min,
            &base.quality_range.max,
        ];
        params.extend(codes.iter().map(|s| s as &dyn ToSql));

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let samples = stmt
            .query_map(&params[..], |row| {
                Ok(GeoSample::new(row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(samples)
    }

    fn competitive_samples(&self, query: &CompetitiveQuery) -> RepoResult<Vec<CompetitiveSample>> {
        let table = query.source.table();
        // Metric names are validated identifiers; quoting keeps mixed case.
        let metric = format!("\"{}\"", query.metric);
        let (filtered, range) = match query.source {
            CompetitiveSource::Detail { signal_range } => ("QOS_RSRP".to_owned(), signal_range),
            CompetitiveSource::Category { value_range } => (format!("{metric} > 0 AND {metric}"), value_range),
        };
        let sql = format!(
            "SELECT Latitude, Longitude, population, {metric}
             FROM {table}
             WHERE {provider} = ?1
               AND band_category = ?2
               AND (?3 IS NULL OR roads_proximity = ?3)
               AND population BETWEEN ?4 AND ?5
               AND {filtered} BETWEEN ?6 AND ?7",
            table = table.table_name(),
            provider = table.provider_column(),
        );
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let samples = stmt
            .query_map(
                rusqlite::params![
                    query.provider,
                    query.band_category,
                    query.roads_proximity,
                    query.population.min,
                    query.population.max,
                    range.min,
                    range.max,
                ],
                |row| {
                    Ok(CompetitiveSample {
                        latitude:   row.get(0)?,
                        longitude:  row.get(1)?,
                        population: row.get(2)?,
                        value:      row.get(3)?,
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(%table, metric = %query.metric, samples = samples.len(), "competitive samples fetched");
        Ok(samples)
    }

    fn best_server_samples(&self, scenario: &ScenarioKey) -> RepoResult<Vec<BestServerSample>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT \"index\", latitude_50, longitude_50, best_server
             FROM pixel_agg
             WHERE ABS(scenario_traffic - ?1) < ?2
               AND scenario_optim = ?3
               AND year = ?4
               AND best_server IS NOT NULL",
        )?;
        let samples = stmt
            .query_map(
                rusqlite::params![
                    scenario.traffic_scenario,
                    TRAFFIC_SCENARIO_TOLERANCE,
                    scenario.optimization_scenario,
                    scenario.year,
                ],
                |row| {
                    let index: i64 = row.get(0)?;
                    Ok(BestServerSample {
                        pixel_index: PixelIndex(index as u64),
                        latitude:    row.get(1)?,
                        longitude:   row.get(2)?,
                        sector:      SectorId::new(sector_code(row.get_ref(3)?)?),
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(samples)
    }
}

/// Sector codes are text, but some exports store them as integers.
fn sector_code(value: ValueRef<'_>) -> rusqlite::Result<String> {
    match value {
        ValueRef::Text(t) => Ok(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Integer(i) => Ok(i.to_string()),
        other => Err(rusqlite::Error::InvalidColumnType(3, "best_server".to_owned(), other.data_type())),
    }
}
