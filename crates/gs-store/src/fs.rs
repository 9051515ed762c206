//! Filesystem-backed artifact store.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use gs_core::{Clock, SystemClock};

use crate::artifact::artifact_name;
use crate::{
    ArtifactHandle, ArtifactKind, ArtifactStore, EvictionReport, EvictionWarning, StoreError, StoreResult,
};

/// Artifacts as files `{prefix}_*.tif` in one directory.
///
/// Only files carrying the prefix are ever touched by eviction, so the
/// directory can be shared with unrelated content.
pub struct FsArtifactStore {
    dir:    PathBuf,
    prefix: String,
    clock:  Arc<dyn Clock>,
}

impl FsArtifactStore {
    /// Open (creating if needed) `dir`, using the system clock.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> StoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, prefix: prefix.into(), clock: Arc::new(SystemClock) })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn path_of(&self, handle: &ArtifactHandle) -> PathBuf {
        handle.path.clone().unwrap_or_else(|| self.dir.join(&handle.name))
    }

    fn owns(&self, file_name: &str) -> bool {
        file_name
            .strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.starts_with('_'))
    }

    fn sweep_entry(&self, entry: &std::fs::DirEntry, cutoff: SystemTime, report: &mut EvictionReport) {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !self.owns(&name) {
            return;
        }
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                warn_eviction(report, name, e);
                return;
            }
        };
        if modified >= cutoff {
            return;
        }
        match std::fs::remove_file(entry.path()) {
            Ok(()) => report.removed.push(name),
            Err(e) => warn_eviction(report, name, e),
        }
    }
}

fn warn_eviction(report: &mut EvictionReport, name: String, error: std::io::Error) {
    tracing::warn!(artifact = %name, %error, "could not evict artifact");
    report.warnings.push(EvictionWarning { name, error: error.to_string() });
}

fn not_found_or_io(handle: &ArtifactHandle, e: std::io::Error) -> StoreError {
    match e.kind() {
        std::io::ErrorKind::NotFound => StoreError::NotFound(handle.name.clone()),
        _ => StoreError::Io(e),
    }
}

impl ArtifactStore for FsArtifactStore {
    fn put(&self, kind: ArtifactKind, bytes: &[u8]) -> StoreResult<ArtifactHandle> {
        let created = self.clock.now();
        let name = artifact_name(&self.prefix, kind, created);
        let path = self.dir.join(&name);

        // Prefixed, so temp files orphaned by a crashed write are swept too.
        let mut tmp = tempfile::Builder::new()
            .prefix(&format!("{}_tmp", self.prefix))
            .tempfile_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)?;

        tracing::debug!(artifact = %name, bytes = bytes.len(), "stored artifact");
        Ok(ArtifactHandle { name, kind, path: Some(path), created })
    }

    fn get(&self, handle: &ArtifactHandle) -> StoreResult<Vec<u8>> {
        std::fs::read(self.path_of(handle)).map_err(|e| not_found_or_io(handle, e))
    }

    fn delete(&self, handle: &ArtifactHandle) -> StoreResult<()> {
        std::fs::remove_file(self.path_of(handle)).map_err(|e| not_found_or_io(handle, e))?;
        tracing::debug!(artifact = %handle.name, "deleted artifact");
        Ok(())
    }

    fn evict_older_than(&self, age: Duration) -> EvictionReport {
        let mut report = EvictionReport::default();
        let Some(cutoff) = self.clock.now().checked_sub(age) else {
            return report;
        };
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn_eviction(&mut report, self.dir.display().to_string(), e);
                return report;
            }
        };
        for entry in entries {
            match entry {
                Ok(entry) => self.sweep_entry(&entry, cutoff, &mut report),
                Err(e) => warn_eviction(&mut report, self.dir.display().to_string(), e),
            }
        }
        if !report.removed.is_empty() {
            tracing::info!(removed = report.removed.len(), warnings = report.warnings.len(), "evicted stale artifacts");
        }
        report
    }
}
