//! Error types for persistence, import and export.
//!
//! None of these are fatal. [`StorageError`] never leaves the persistence
//! adapter; [`ImportError`] and [`ExportError`] are returned to the UI so they
//! can be shown to the user.

use std::path::PathBuf;

/// Failures of the durable key-value backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading, writing or removing the slot file failed.
    #[error("storage I/O error for slot `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be serialized or the stored text was malformed.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend refused the write because it is full.
    #[error("storage quota exceeded for slot `{0}`")]
    QuotaExceeded(String),

    /// The backend cannot be used at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Failures while importing a GeoJSON file.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("could not read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file has no `features` array")]
    MissingFeatures,

    #[error("feature {index} is invalid: {reason}")]
    InvalidFeature { index: usize, reason: String },

    #[error("the map is still loading, try again in a moment")]
    NotReady,
}

/// Failures while exporting the annotation set.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("could not serialize annotations: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_feature_message_names_index() {
        let error = ImportError::InvalidFeature {
            index: 3,
            reason: "bad coordinates".to_string(),
        };
        assert_eq!(error.to_string(), "feature 3 is invalid: bad coordinates");
    }

    #[test]
    fn test_export_write_message_contains_path() {
        let error = ExportError::Write {
            path: PathBuf::from("/tmp/map-data.geojson"),
            source: std::io::Error::other("disk full"),
        };
        let message = error.to_string();
        assert!(message.contains("/tmp/map-data.geojson"));
        assert!(message.contains("disk full"));
    }

    #[test]
    fn test_storage_error_from_serde() {
        let serde_error = serde_json::from_str::<u32>("nope").unwrap_err();
        let error = StorageError::from(serde_error);
        assert!(matches!(error, StorageError::Serialization(_)));
    }
}
