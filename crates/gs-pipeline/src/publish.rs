//! Map-layer publishing seam.

use gs_store::ArtifactHandle;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("publish of layer {layer:?} failed: {message}")]
pub struct PublishError {
    pub layer:   String,
    pub message: String,
}

/// Registers a stored image as a servable map layer.
///
/// Fire-and-forget from the pipeline's point of view: an error is logged
/// and reported in the request output, never retried, never fatal.
pub trait Publisher: Send + Sync {
    fn publish(&self, layer: &str, artifact: &ArtifactHandle, workspace: &str) -> Result<(), PublishError>;
}

/// A [`Publisher`] that accepts everything and does nothing.
pub struct NoopPublisher;

impl Publisher for NoopPublisher {
    fn publish(&self, _layer: &str, _artifact: &ArtifactHandle, _workspace: &str) -> Result<(), PublishError> {
        Ok(())
    }
}
