//! In-memory repository.

use std::collections::HashSet;

use gs_core::{
    AggregateRecord, BaselinePixel, BaselineQuery, BestServerSample, CompetitiveQuery, CompetitiveRecord,
    CompetitiveSample, CompetitiveTable, GeoSample, PixelIndex, PixelRecord, ScenarioKey, SectorQuery, SiteSet,
};

use crate::{MeasurementRepository, RepoError, RepoResult};

/// Repository backed by plain vectors.
///
/// Used by tests, by the demo (after CSV loading), and anywhere the full
/// data set fits in RAM.  Rows are returned in insertion order.  A metric
/// column no row carries yields samples without a value rather than an
/// error.
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    sectors:    Vec<PixelRecord>,
    aggregates: Vec<AggregateRecord>,
    detail:     Vec<CompetitiveRecord>,
    category:   Vec<CompetitiveRecord>,
}

impl MemoryRepository {
    pub fn new(sectors: Vec<PixelRecord>, aggregates: Vec<AggregateRecord>) -> Self {
        Self { sectors, aggregates, ..Self::default() }
    }

    /// Replace the rows of one competitive-benchmark table.
    pub fn with_competitive(mut self, table: CompetitiveTable, rows: Vec<CompetitiveRecord>) -> Self {
        match table {
            CompetitiveTable::Detail   => self.detail = rows,
            CompetitiveTable::Category => self.category = rows,
        }
        self
    }

    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    pub fn aggregate_count(&self) -> usize {
        self.aggregates.len()
    }
}

impl MeasurementRepository for MemoryRepository {
    fn switch_off_records(
        &self,
        scenario: &ScenarioKey,
        sites:    &SiteSet,
    ) -> RepoResult<Vec<PixelRecord>> {
        if sites.is_empty() {
            return Ok(Vec::new());
        }

        // Step 1: pixels served by any removed site.
        let affected: HashSet<PixelIndex> = self
            .sectors
            .iter()
            .filter(|r| r.scenario.matches(scenario) && sites.contains(&r.site_id))
            .map(|r| r.pixel_index)
            .collect();

        // Step 2: every sector on those pixels.
        let records: Vec<PixelRecord> = self
            .sectors
            .iter()
            .filter(|r| r.scenario.matches(scenario) && affected.contains(&r.pixel_index))
            .cloned()
            .collect();

        tracing::debug!(
            affected_pixels = affected.len(),
            records = records.len(),
            "switch-off records fetched"
        );
        Ok(records)
    }

    fn baseline(&self, query: &BaselineQuery) -> RepoResult<Vec<BaselinePixel>> {
        Ok(self
            .aggregates
            .iter()
            .filter(|a| query.accepts(&a.scenario, a.signal_level, a.quality_index))
            .map(|a| a.to_baseline(query.kpi))
            .collect())
    }

    fn sector_samples(&self, query: &SectorQuery) -> RepoResult<Vec<GeoSample>> {
        let kpi = query.baseline.kpi;
        if !kpi.in_sector_table() {
            return Err(RepoError::NotPerSector(kpi));
        }
        Ok(self
            .sectors
            .iter()
            .filter(|r| query.selection.includes(&r.site_id, &r.sector_id))
            .filter(|r| query.baseline.accepts(&r.scenario, r.signal_level, r.quality_index))
            .map(|r| r.sample(kpi))
            .collect())
    }

    fn competitive_samples(&self, query: &CompetitiveQuery) -> RepoResult<Vec<CompetitiveSample>> {
        let rows = match query.source.table() {
            CompetitiveTable::Detail   => &self.detail,
            CompetitiveTable::Category => &self.category,
        };
        Ok(rows.iter().filter(|r| query.accepts(r)).map(|r| query.sample(r)).collect())
    }

    fn best_server_samples(&self, scenario: &ScenarioKey) -> RepoResult<Vec<BestServerSample>> {
        Ok(self
            .aggregates
            .iter()
            .filter(|a| a.scenario.matches(scenario))
            .filter_map(|a| {
                a.best_server.clone().map(|sector| BestServerSample {
                    pixel_index: a.pixel_index,
                    latitude: a.latitude,
                    longitude: a.longitude,
                    sector,
                })
            })
            .collect())
    }
}
