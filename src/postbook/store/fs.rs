use super::PersistentStore;
use crate::error::{PostError, Result};
use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File-backed store: each key lives in `<root>/<key>.json`.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    pub fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(PostError::Io)?;
        }
        Ok(())
    }
}

impl PersistentStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(PostError::Io)?;
        let value = serde_json::from_str(&content).map_err(PostError::Serialization)?;
        log::debug!("read {} ({} bytes)", path.display(), content.len());
        Ok(Some(value))
    }

    fn write(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.key_path(key)?;
        self.ensure_dir()?;

        let content = serde_json::to_string_pretty(value).map_err(PostError::Serialization)?;

        // Write to a sibling temp file, then rename over the target
        let tmp_path = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp_path, &content).map_err(PostError::Io)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(PostError::Io(e));
        }

        log::debug!("wrote {} ({} bytes)", path.display(), content.len());
        Ok(())
    }

    fn set_aside(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let mut target = self.root.join(format!("{}.json.corrupt-{}", key, stamp));
        if target.exists() {
            target = self.root.join(format!(
                "{}.json.corrupt-{}-{}",
                key,
                stamp,
                Uuid::new_v4().simple()
            ));
        }
        fs::rename(&path, &target).map_err(PostError::Io)?;

        log::warn!("moved {} to {}", path.display(), target.display());
        Ok(Some(target.display().to_string()))
    }
}

/// Keys become file names, so only `[A-Za-z0-9_-]` is accepted.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PostError::Storage(format!("Invalid storage key: {:?}", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn read_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.read("posts").unwrap().is_none());
    }

    #[test]
    fn write_then_read() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        let value = json!([{"title": "Hello"}]);

        store.write("posts", &value).unwrap();

        assert_eq!(store.read("posts").unwrap(), Some(value));
        assert!(dir.path().join("nested/posts.json").exists());
    }

    #[test]
    fn write_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.write("posts", &json!([])).unwrap();
        store.write("posts", &json!([1])).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["posts.json".to_string()]);
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("posts.json"), "{not json").unwrap();
        let store = FileStore::new(dir.path());

        match store.read("posts") {
            Err(PostError::Serialization(_)) => {}
            other => panic!("Expected Serialization error, got {:?}", other),
        }
    }

    #[test]
    fn set_aside_keeps_original_bytes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("posts.json"), "{not json").unwrap();
        let store = FileStore::new(dir.path());

        let moved = store.set_aside("posts").unwrap().unwrap();
        assert!(moved.contains("posts.json.corrupt-"));
        assert_eq!(fs::read_to_string(&moved).unwrap(), "{not json");
        assert!(store.read("posts").unwrap().is_none());

        store.write("posts", &json!([])).unwrap();
        assert_eq!(fs::read_to_string(&moved).unwrap(), "{not json");
    }

    #[test]
    fn set_aside_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.set_aside("posts").unwrap().is_none());
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.write("../escape", &json!(1)),
            Err(PostError::Storage(_))
        ));
        assert!(matches!(store.read(""), Err(PostError::Storage(_))));
    }
}
