//! In-memory artifact store, for tests and single-process demos.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use gs_core::{Clock, SystemClock};
use parking_lot::Mutex;

use crate::artifact::artifact_name;
use crate::{ArtifactHandle, ArtifactKind, ArtifactStore, EvictionReport, StoreError, StoreResult};

pub struct MemoryArtifactStore {
    prefix:    String,
    clock:     Arc<dyn Clock>,
    artifacts: Mutex<BTreeMap<String, (ArtifactHandle, Vec<u8>)>>,
}

impl MemoryArtifactStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), clock: Arc::new(SystemClock), artifacts: Mutex::new(BTreeMap::new()) }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn len(&self) -> usize {
        self.artifacts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.lock().is_empty()
    }

    /// Handles of every stored artifact, in name order.
    pub fn handles(&self) -> Vec<ArtifactHandle> {
        self.artifacts.lock().values().map(|(h, _)| h.clone()).collect()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn put(&self, kind: ArtifactKind, bytes: &[u8]) -> StoreResult<ArtifactHandle> {
        let created = self.clock.now();
        let handle = ArtifactHandle { name: artifact_name(&self.prefix, kind, created), kind, path: None, created };
        self.artifacts.lock().insert(handle.name.clone(), (handle.clone(), bytes.to_vec()));
        Ok(handle)
    }

    fn get(&self, handle: &ArtifactHandle) -> StoreResult<Vec<u8>> {
        self.artifacts
            .lock()
            .get(&handle.name)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| StoreError::NotFound(handle.name.clone()))
    }

    fn delete(&self, handle: &ArtifactHandle) -> StoreResult<()> {
        self.artifacts
            .lock()
            .remove(&handle.name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(handle.name.clone()))
    }

    fn evict_older_than(&self, age: Duration) -> EvictionReport {
        let mut report = EvictionReport::default();
        let Some(cutoff) = self.clock.now().checked_sub(age) else {
            return report;
        };
        self.artifacts.lock().retain(|name, (handle, _)| {
            let keep = handle.created >= cutoff;
            if !keep {
                report.removed.push(name.clone());
            }
            keep
        });
        report
    }
}
