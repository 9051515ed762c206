//! Caller-owned retry policy for repository calls.
//!
//! The pipeline itself never retries.  A caller that wants retries wraps its
//! repository in [`RetryingRepository`] before handing it over.

use std::time::Duration;

use gs_core::{
    BaselinePixel, BaselineQuery, BestServerSample, CompetitiveQuery, CompetitiveSample, GeoSample, PixelRecord,
    ScenarioKey, SectorQuery, SiteSet,
};
use gs_repo::{MeasurementRepository, RepoResult};
use serde::{Deserialize, Serialize};

/// Up to `max_retries` extra attempts, doubling the delay after each one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries:    u32,
    pub retry_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3, retry_delay_ms: 100 }
    }
}

impl RetryPolicy {
    /// A single attempt.
    pub fn none() -> Self {
        Self { max_retries: 0, retry_delay_ms: 0 }
    }

    /// Pause before retry number `retry` (1-based): the base delay doubled
    /// for every earlier retry, saturating at `Duration::MAX`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        Duration::from_millis(self.retry_delay_ms).saturating_mul(factor)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// retries are used up.  The last error is returned.
    pub fn run<T, F>(&self, what: &str, mut op: F) -> RepoResult<T>
    where
        F: FnMut() -> RepoResult<T>,
    {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(v) => return Ok(v),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(what, attempt, error = %e, "retrying repository call");
                    std::thread::sleep(self.backoff(attempt));
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// A repository whose every call goes through a [`RetryPolicy`].
pub struct RetryingRepository<R> {
    inner:  R,
    policy: RetryPolicy,
}

impl<R: MeasurementRepository> RetryingRepository<R> {
    pub fn new(inner: R, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: MeasurementRepository> MeasurementRepository for RetryingRepository<R> {
    fn switch_off_records(&self, scenario: &ScenarioKey, sites: &SiteSet) -> RepoResult<Vec<PixelRecord>> {
        self.policy.run("switch_off_records", || self.inner.switch_off_records(scenario, sites))
    }

    fn baseline(&self, query: &BaselineQuery) -> RepoResult<Vec<BaselinePixel>> {
        self.policy.run("baseline", || self.inner.baseline(query))
    }

    fn sector_samples(&self, query: &SectorQuery) -> RepoResult<Vec<GeoSample>> {
        self.policy.run("sector_samples", || self.inner.sector_samples(query))
    }

    fn competitive_samples(&self, query: &CompetitiveQuery) -> RepoResult<Vec<CompetitiveSample>> {
        self.policy.run("competitive_samples", || self.inner.competitive_samples(query))
    }

    fn best_server_samples(&self, scenario: &ScenarioKey) -> RepoResult<Vec<BestServerSample>> {
        self.policy.run("best_server_samples", || self.inner.best_server_samples(scenario))
    }
}
