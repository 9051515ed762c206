//! Error type for gs-pipeline.

use gs_core::CoreError;
use gs_raster::RasterError;
use gs_render::RenderError;
use gs_repo::RepoError;
use gs_store::StoreError;
use thiserror::Error;

/// Any failure of a map request.  Each stage's error converts via `?`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("repository: {0}")]
    Repo(#[from] RepoError),

    #[error("raster: {0}")]
    Raster(#[from] RasterError),

    #[error("render: {0}")]
    Render(#[from] RenderError),

    #[error("artifact store: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
