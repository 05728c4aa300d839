//! File-backed JSON snapshot store.
//!
//! The snapshot is a single JSON document at a configured path. Writes go
//! through a temporary file followed by a rename, so a crash mid-write
//! leaves the previous blob intact rather than a truncated one.

use std::fs;
use std::path::{Path, PathBuf};

use mycel_types::Snapshot;

use crate::error::StoreError;

/// Persists [`Snapshot`] values to a file on disk.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    /// Path of the snapshot blob.
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store backed by the file at `path`.
    ///
    /// The file does not need to exist yet; the first [`Self::save`]
    /// creates it (and any missing parent directories).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Return the path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted snapshot, degrading to an empty one on any
    /// failure.
    ///
    /// A missing file is the normal first-run case and is logged at
    /// `debug`; unreadable or corrupt blobs are logged at `warn`. This
    /// function never fails.
    pub fn load_or_default(&self) -> Snapshot {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No snapshot file, starting empty");
                return Snapshot::default();
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Failed to read snapshot, starting empty"
                );
                return Snapshot::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Corrupt snapshot, starting empty"
                );
                Snapshot::default()
            }
        }
    }

    /// Write the snapshot to disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be written, or
    /// [`StoreError::Serde`] if serialization fails. Engine callers use
    /// [`Self::save_best_effort`] instead and never observe these.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Write the snapshot to disk, absorbing any failure.
    ///
    /// Failures are logged at `warn` and otherwise ignored: the simulation
    /// is fully regenerable from continued activity, so losing a save is
    /// acceptable.
    pub fn save_best_effort(&self, snapshot: &Snapshot) {
        if let Err(err) = self.save(snapshot) {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "Snapshot save failed, continuing without persistence"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use chrono::Utc;
    use mycel_types::edge_key_string;

    use super::*;

    /// Per-test unique path under the system temp directory.
    fn temp_store_path(tag: &str) -> PathBuf {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let serial = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "mycel-store-test-{}-{serial}-{tag}.json",
            std::process::id()
        ))
    }

    fn make_snapshot() -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.nutrients.insert(String::from("atrium"), 4.5);
        snapshot.nutrients.insert(String::from("cellar"), 0.25);
        snapshot.ripeness.insert(String::from("atrium"), 0.5);
        snapshot
            .trails
            .insert(edge_key_string("atrium", "cellar"), 0.375);
        snapshot
            .last_visit
            .insert(String::from("atrium"), Utc::now());
        snapshot
    }

    #[test]
    fn save_then_load_roundtrip() {
        let path = temp_store_path("roundtrip");
        let store = SnapshotStore::new(&path);
        let snapshot = make_snapshot();

        store.save(&snapshot).unwrap();
        let restored = store.load_or_default();
        assert_eq!(snapshot, restored);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_loads_empty() {
        let store = SnapshotStore::new(temp_store_path("missing"));
        assert!(store.load_or_default().is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let path = temp_store_path("corrupt");
        fs::write(&path, "not json {{{").unwrap();

        let store = SnapshotStore::new(&path);
        assert!(store.load_or_default().is_empty());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn save_overwrites_previous_blob() {
        let path = temp_store_path("overwrite");
        let store = SnapshotStore::new(&path);

        store.save(&make_snapshot()).unwrap();
        let mut second = Snapshot::default();
        second.nutrients.insert(String::from("archive"), 9.0);
        store.save(&second).unwrap();

        assert_eq!(store.load_or_default(), second);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = temp_store_path("nested-dir");
        let path = dir.join("deep").join("snapshot.json");
        let store = SnapshotStore::new(&path);

        store.save(&make_snapshot()).unwrap();
        assert!(path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_best_effort_absorbs_failure() {
        // A directory path cannot be written as a file.
        let dir = std::env::temp_dir();
        let store = SnapshotStore::new(&dir);
        store.save_best_effort(&make_snapshot());
    }
}
