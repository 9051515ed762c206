//! The artifact store seam.

use std::time::Duration;

use crate::{ArtifactHandle, ArtifactKind, EvictionReport, StoreResult};

/// Shared storage for rendered artifacts.
///
/// Implementations are used concurrently by independent requests; `put`
/// must never hand out the same name twice.
pub trait ArtifactStore: Send + Sync {
    /// Store `bytes` atomically and return its handle.
    fn put(&self, kind: ArtifactKind, bytes: &[u8]) -> StoreResult<ArtifactHandle>;

    fn get(&self, handle: &ArtifactHandle) -> StoreResult<Vec<u8>>;

    /// Remove one artifact, e.g. the first half of a request that failed
    /// before its second artifact was stored.
    fn delete(&self, handle: &ArtifactHandle) -> StoreResult<()>;

    /// Delete every artifact created more than `age` ago.  Never fails;
    /// problems are reported in the returned [`EvictionReport`].
    fn evict_older_than(&self, age: Duration) -> EvictionReport;

    /// Sweep stale artifacts, then store the new one.
    fn put_after_sweep(
        &self,
        retention: Duration,
        kind:      ArtifactKind,
        bytes:     &[u8],
    ) -> StoreResult<(ArtifactHandle, EvictionReport)> {
        let report = self.evict_older_than(retention);
        let handle = self.put(kind, bytes)?;
        Ok((handle, report))
    }
}

impl<S: ArtifactStore + ?Sized> ArtifactStore for std::sync::Arc<S> {
    fn put(&self, kind: ArtifactKind, bytes: &[u8]) -> StoreResult<ArtifactHandle> {
        (**self).put(kind, bytes)
    }

    fn get(&self, handle: &ArtifactHandle) -> StoreResult<Vec<u8>> {
        (**self).get(handle)
    }

    fn delete(&self, handle: &ArtifactHandle) -> StoreResult<()> {
        (**self).delete(handle)
    }

    fn evict_older_than(&self, age: Duration) -> EvictionReport {
        (**self).evict_older_than(age)
    }
}
