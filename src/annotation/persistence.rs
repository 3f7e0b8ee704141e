//! Best-effort persistence of the annotation snapshot to a single named slot.
//!
//! Storage failures are logged and swallowed here; nothing in this module
//! returns an error to the engine.

use std::path::{Path, PathBuf};

use bevy::log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::error::StorageError;
use super::geojson::FeatureCollection;
use super::marker::Marker;
use super::mode::Mode;

/// Fixed key of the persisted snapshot.
pub const SNAPSHOT_KEY: &str = "mapState";

/// The full persisted annotation state at one instant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnotationSnapshot {
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub polygons: FeatureCollection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, alias = "currentMode")]
    pub mode: Mode,
    #[serde(default)]
    pub timestamp: i64,
}

/// Synchronous key-value storage. Every call may fail.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn io_error(key: &str, source: std::io::Error) -> StorageError {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::StorageFull => StorageError::QuotaExceeded(key.to_string()),
            ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem => {
                StorageError::Unavailable(source.to_string())
            }
            _ => StorageError::Io {
                key: key.to_string(),
                source,
            },
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.slot_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(key, e))?;

        // Write next to the slot and rename so a crash never leaves half a file
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| Self::io_error(key, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| Self::io_error(key, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}

/// Reads and writes [`AnnotationSnapshot`]s under [`SNAPSHOT_KEY`].
#[derive(Debug)]
pub struct PersistenceAdapter<K> {
    backend: K,
    key: String,
}

impl<K: KeyValueStore> PersistenceAdapter<K> {
    pub fn new(backend: K) -> Self {
        Self {
            backend,
            key: SNAPSHOT_KEY.to_string(),
        }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &K {
        &self.backend
    }

    #[cfg(test)]
    pub fn backend_mut(&mut self) -> &mut K {
        &mut self.backend
    }

    /// Writes the snapshot, replacing whatever was stored. Failures are logged.
    pub fn save(&mut self, snapshot: &AnnotationSnapshot) {
        match self.try_save(snapshot) {
            Ok(()) => debug!(
                "Saved snapshot: {} markers, {} polygons",
                snapshot.markers.len(),
                snapshot.polygons.len()
            ),
            Err(e) => warn!("Failed to save annotations: {}", e),
        }
    }

    fn try_save(&mut self, snapshot: &AnnotationSnapshot) -> Result<(), StorageError> {
        let json = serde_json::to_string(snapshot)?;
        self.backend.set(&self.key, &json)
    }

    /// Reads the snapshot. Missing, unreadable and malformed slots all read
    /// as `None`.
    pub fn load(&self) -> Option<AnnotationSnapshot> {
        match self.try_load() {
            Ok(Some(snapshot)) => {
                info!(
                    "Loaded snapshot: {} markers, {} polygons",
                    snapshot.markers.len(),
                    snapshot.polygons.len()
                );
                Some(snapshot)
            }
            Ok(None) => {
                info!("No saved annotations found");
                None
            }
            Err(e) => {
                warn!("Ignoring saved annotations: {}", e);
                None
            }
        }
    }

    fn try_load(&self) -> Result<Option<AnnotationSnapshot>, StorageError> {
        let Some(json) = self.backend.get(&self.key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Removes the slot. Removing a missing slot is fine.
    pub fn clear(&mut self) {
        if let Err(e) = self.backend.remove(&self.key) {
            warn!("Failed to clear saved annotations: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::annotation::geojson::Feature;
    use crate::annotation::test_support::MemoryStore;

    fn sample_snapshot() -> AnnotationSnapshot {
        AnnotationSnapshot {
            markers: vec![
                Marker {
                    id: 1,
                    lng: 77.2,
                    lat: 28.6,
                },
                Marker {
                    id: 2,
                    lng: 77.3,
                    lat: 28.7,
                },
            ],
            polygons: FeatureCollection::new(vec![
                Feature::polygon(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]).with_id("p1"),
            ]),
            area: Some(6_195_000_000.5),
            mode: Mode::Polygon,
            timestamp: 1_700_000_000_000,
        }
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("geomark-test-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let mut adapter = PersistenceAdapter::new(MemoryStore::default());
        let snapshot = sample_snapshot();
        adapter.save(&snapshot);
        assert_eq!(adapter.load(), Some(snapshot));
    }

    #[test]
    fn test_last_write_wins() {
        let mut adapter = PersistenceAdapter::new(MemoryStore::default());
        adapter.save(&sample_snapshot());
        let empty = AnnotationSnapshot::default();
        adapter.save(&empty);
        assert_eq!(adapter.load(), Some(empty));
        assert_eq!(adapter.backend().slots.len(), 1);
    }

    #[test]
    fn test_load_absent_is_none() {
        let adapter = PersistenceAdapter::new(MemoryStore::default());
        assert_eq!(adapter.load(), None);
    }

    #[test]
    fn test_load_malformed_is_none() {
        let mut adapter = PersistenceAdapter::new(MemoryStore::default());
        adapter
            .backend_mut()
            .slots
            .insert(SNAPSHOT_KEY.to_string(), "{not json".to_string());
        assert_eq!(adapter.load(), None);
    }

    #[test]
    fn test_failing_backend_never_propagates() {
        let mut adapter = PersistenceAdapter::new(MemoryStore::failing());
        adapter.save(&sample_snapshot());
        adapter.clear();
        assert_eq!(adapter.load(), None);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut adapter = PersistenceAdapter::new(MemoryStore::default());
        adapter.save(&sample_snapshot());
        adapter.clear();
        adapter.clear();
        assert_eq!(adapter.load(), None);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let value = serde_json::to_value(sample_snapshot()).unwrap();
        assert_eq!(value["mode"], "polygon");
        assert_eq!(value["markers"][0], json!({ "id": 1, "lng": 77.2, "lat": 28.6 }));
        assert_eq!(value["polygons"]["type"], "FeatureCollection");

        let no_area = AnnotationSnapshot::default();
        let value = serde_json::to_value(no_area).unwrap();
        assert!(value.get("area").is_none());
    }

    #[test]
    fn test_legacy_current_mode_key_is_accepted() {
        let snapshot: AnnotationSnapshot = serde_json::from_value(json!({
            "markers": [{ "id": 5, "lng": 1.0, "lat": 2.0 }],
            "polygons": { "type": "FeatureCollection", "features": [] },
            "currentMode": "polygon",
            "timestamp": 10
        }))
        .unwrap();
        assert_eq!(snapshot.mode, Mode::Polygon);
        assert_eq!(snapshot.area, None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = temp_dir();
        let mut store = FileStore::new(&dir);

        assert_eq!(store.get("slot").unwrap(), None);
        store.set("slot", "hello").unwrap();
        assert_eq!(store.get("slot").unwrap().as_deref(), Some("hello"));
        assert!(store.slot_path("slot").exists());
        assert!(!store.slot_path("slot").with_extension("json.tmp").exists());

        store.remove("slot").unwrap();
        store.remove("slot").unwrap();
        assert_eq!(store.get("slot").unwrap(), None);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_store_adapter_round_trip() {
        let dir = temp_dir();
        let mut adapter = PersistenceAdapter::new(FileStore::new(&dir));
        let snapshot = sample_snapshot();
        adapter.save(&snapshot);
        assert_eq!(adapter.load(), Some(snapshot));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_store_classifies_io_errors() {
        use std::io::{Error, ErrorKind};

        let full = FileStore::io_error("mapState", Error::from(ErrorKind::StorageFull));
        assert!(matches!(full, StorageError::QuotaExceeded(ref key) if key == "mapState"));

        let denied = FileStore::io_error("mapState", Error::from(ErrorKind::PermissionDenied));
        assert!(matches!(denied, StorageError::Unavailable(_)));

        let other = FileStore::io_error("mapState", Error::from(ErrorKind::InvalidData));
        assert!(matches!(other, StorageError::Io { ref key, .. } if key == "mapState"));
    }
}
