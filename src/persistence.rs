//! JSON artifact persistence
//!
//! All persisted artifacts (model, preprocessor) go through this gateway.
//! Saves are atomic: the value is written to a sibling temp file and then
//! renamed over the destination, so a concurrent reader never observes a
//! partial artifact.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{Result, StudyMetricsError};

/// Serialize a value as JSON at `path`, atomically
pub fn save_object<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string(value)?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;

    info!(path = %path.display(), "artifact written");
    Ok(())
}

/// Load a JSON value from `path`; a missing file is `ArtifactMissing`
pub fn load_object<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(StudyMetricsError::ArtifactMissing(
            path.display().to_string(),
        ));
    }

    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Blob {
        name: String,
        value: f64,
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.json");

        let blob = Blob {
            name: "x".to_string(),
            value: 1.5,
        };
        save_object(&blob, &path).unwrap();

        let restored: Blob = load_object(&path).unwrap();
        assert_eq!(restored, blob);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/blob.json");

        let blob = Blob {
            name: "y".to_string(),
            value: 2.0,
        };
        save_object(&blob, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.json");

        let first = Blob {
            name: "first".to_string(),
            value: 1.0,
        };
        let second = Blob {
            name: "second".to_string(),
            value: 2.0,
        };
        save_object(&first, &path).unwrap();
        save_object(&second, &path).unwrap();

        let restored: Blob = load_object(&path).unwrap();
        assert_eq!(restored, second);

        // No temp file left behind
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = load_object::<Blob>(&path).unwrap_err();
        assert!(matches!(err, StudyMetricsError::ArtifactMissing(_)));
    }
}
