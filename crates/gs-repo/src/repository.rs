//! The `MeasurementRepository` trait.

use gs_core::{
    BaselinePixel, BaselineQuery, BestServerSample, CompetitiveQuery, CompetitiveSample, GeoSample, PixelRecord,
    ScenarioKey, SectorQuery, SiteSet,
};

use crate::RepoResult;

/// Read-only access to pixel measurements.
///
/// Implementations must be safe for concurrent reads; the pipeline holds a
/// shared reference across requests and never locks it.  Failures are
/// returned as-is: retrying is the caller's business.
pub trait MeasurementRepository: Send + Sync {
    /// Every sector record, for `scenario`, on every pixel served by at
    /// least one of `sites`.
    ///
    /// This is a two-step fetch: first the set of affected pixel indices,
    /// then all sector rows on those pixels, including rows from sites that
    /// stay on air.  An empty `sites` yields an empty vector.
    fn switch_off_records(
        &self,
        scenario: &ScenarioKey,
        sites:    &SiteSet,
    ) -> RepoResult<Vec<PixelRecord>>;

    /// Aggregate pixels passing the scenario and radio-range filters,
    /// projected to `query.kpi`.
    fn baseline(&self, query: &BaselineQuery) -> RepoResult<Vec<BaselinePixel>>;

    /// Per-sector samples of `query.baseline.kpi` for the selected sectors
    /// (or every sector of the selected site).
    ///
    /// Fails with [`RepoError::NotPerSector`](crate::RepoError::NotPerSector)
    /// for KPIs that only exist per pixel.
    fn sector_samples(&self, query: &SectorQuery) -> RepoResult<Vec<GeoSample>>;

    /// Benchmark rows from `query.source.table()` passing the provider,
    /// band, road-proximity, population and table-specific filters,
    /// projected to `query.metric`.
    fn competitive_samples(&self, query: &CompetitiveQuery) -> RepoResult<Vec<CompetitiveSample>>;

    /// Best-serving sector of every aggregate pixel of `scenario` that
    /// records one.
    fn best_server_samples(&self, scenario: &ScenarioKey) -> RepoResult<Vec<BestServerSample>>;
}

impl<R: MeasurementRepository + ?Sized> MeasurementRepository for &R {
    fn switch_off_records(&self, scenario: &ScenarioKey, sites: &SiteSet) -> RepoResult<Vec<PixelRecord>> {
        (**self).switch_off_records(scenario, sites)
    }

    fn baseline(&self, query: &BaselineQuery) -> RepoResult<Vec<BaselinePixel>> {
        (**self).baseline(query)
    }

    fn sector_samples(&self, query: &SectorQuery) -> RepoResult<Vec<GeoSample>> {
        (**self).sector_samples(query)
    }

    fn competitive_samples(&self, query: &CompetitiveQuery) -> RepoResult<Vec<CompetitiveSample>> {
        (**self).competitive_samples(query)
    }

    fn best_server_samples(&self, scenario: &ScenarioKey) -> RepoResult<Vec<BestServerSample>> {
        (**self).best_server_samples(scenario)
    }
}
