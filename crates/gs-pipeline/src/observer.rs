//! Request observer trait for progress reporting.

use std::fmt;
use std::time::Duration;

use gs_store::{ArtifactHandle, EvictionReport};

/// The strictly sequential stages of one map request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    Simulate,
    Rasterize,
    Colorize,
    Store,
    Publish,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Fetch     => "fetch",
            Stage::Simulate  => "simulate",
            Stage::Rasterize => "rasterize",
            Stage::Colorize  => "colorize",
            Stage::Store     => "store",
            Stage::Publish   => "publish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callbacks invoked by the pipeline as a request moves through its stages.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait PipelineObserver {
    fn on_stage_start(&mut self, _stage: Stage) {}

    /// Only called for stages that succeeded.
    fn on_stage_end(&mut self, _stage: Stage, _elapsed: Duration) {}

    /// Called after the pre-store sweep of stale artifacts.
    fn on_eviction(&mut self, _report: &EvictionReport) {}

    fn on_artifact(&mut self, _artifact: &ArtifactHandle) {}
}

/// A [`PipelineObserver`] that does nothing.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}
