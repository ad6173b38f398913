//! Snapshot persistence.
//!
//! A refresh writes the cache to disk; a recommendation reads it back. The
//! file is replaced atomically (write to temp, rename) so a reader never sees
//! a half-written snapshot.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SnapshotError;
use crate::model::HostCache;

/// Snapshot file format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A persisted inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version.
    pub version: u32,

    /// When the inventory was read from the provider.
    pub refreshed_at: DateTime<Utc>,

    pub cache: HostCache,
}

impl Snapshot {
    /// Wrap a freshly refreshed cache.
    pub fn new(cache: HostCache) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            refreshed_at: Utc::now(),
            cache,
        }
    }

    /// Time elapsed since the refresh.
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.refreshed_at
    }
}

/// Reads and writes snapshots at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot.
    ///
    /// A missing file is reported as [`SnapshotError::Missing`] so callers
    /// can tell the user to refresh first.
    pub fn load(&self) -> Result<Snapshot, SnapshotError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SnapshotError::Missing(self.path.clone()));
            }
            Err(source) => {
                return Err(SnapshotError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        info!(
            path = %self.path.display(),
            refreshed_at = %snapshot.refreshed_at,
            host_groups = snapshot.cache.host_groups.len(),
            hosts = snapshot.cache.host_count(),
            "Loaded inventory snapshot"
        );

        Ok(snapshot)
    }

    /// Save the snapshot atomically.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SnapshotError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp_path = self.path.with_extension("tmp");
        let content =
            serde_json::to_string_pretty(snapshot).map_err(SnapshotError::Serialize)?;

        fs::write(&tmp_path, content).map_err(|source| SnapshotError::Io {
            path: tmp_path.clone(),
            source,
        })?;

        fs::rename(&tmp_path, &self.path).map_err(|source| SnapshotError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(
            path = %self.path.display(),
            hosts = snapshot.cache.host_count(),
            "Saved inventory snapshot"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HostGroup;
    use tempfile::TempDir;

    #[test]
    fn test_missing_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("none.json"));
        assert!(matches!(store.load(), Err(SnapshotError::Missing(_))));
    }

    #[test]
    fn test_version_mismatch() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("old.json"));

        let mut snapshot = Snapshot::new(HostCache::new());
        snapshot.version = 99;
        store.save(&snapshot).unwrap();

        assert!(matches!(
            store.load(),
            Err(SnapshotError::VersionMismatch { found: 99, expected: SNAPSHOT_VERSION })
        ));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SnapshotStore::new(path);
        assert!(matches!(store.load(), Err(SnapshotError::Parse { .. })));
    }

    #[test]
    fn test_save_creates_parent_and_leaves_no_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/snapshot.json");
        let store = SnapshotStore::new(&path);

        let mut cache = HostCache::new();
        cache.insert_group(HostGroup {
            id: "g".to_string(),
            name: "g".to_string(),
            ..HostGroup::default()
        });
        store.save(&Snapshot::new(cache)).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(store.load().unwrap().cache.host_groups.len(), 1);
    }

    #[test]
    fn test_age_is_non_negative() {
        let snapshot = Snapshot::new(HostCache::new());
        assert!(snapshot.age() >= chrono::Duration::zero());
    }
}
