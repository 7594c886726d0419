use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::error::PersistenceError;

/// All keys in a single JSON object on disk
///
/// Writes go to `<path>.tmp` first and are renamed over the real file so a
/// crash mid-write never leaves a truncated save.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self, key: &str) -> Result<BTreeMap<String, String>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|source| PersistenceError::Decode {
                key: key.to_string(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(PersistenceError::read(key, e)),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.read_all(key)?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        // A corrupt file is replaced; an unreadable one is left alone
        let mut values = match self.read_all(key) {
            Ok(values) => values,
            Err(e @ PersistenceError::Decode { .. }) => {
                log::warn!("Replacing corrupt store {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        values.insert(key.to_string(), value.to_string());

        let json = serde_json::to_string_pretty(&values).map_err(|source| PersistenceError::Encode {
            key: key.to_string(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::write(key, e))?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| PersistenceError::write(key, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| PersistenceError::write(key, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = FileStore::new(&path);
        store.set("a", "1").unwrap();
        store.set("b", "two").unwrap();
        store.set("a", "3").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("a").unwrap().as_deref(), Some("3"));
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("two"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_file_reports_then_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = FileStore::new(&path);
        assert!(matches!(store.get("a"), Err(PersistenceError::Decode { .. })));

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_unreadable_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        // A directory where the file should be cannot be read as text
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep.txt"), "precious").unwrap();

        let mut store = FileStore::new(&path);
        assert!(matches!(store.get("a"), Err(PersistenceError::Read { .. })));
        assert!(matches!(store.set("a", "1"), Err(PersistenceError::Read { .. })));

        assert!(path.is_dir());
        assert_eq!(fs::read_to_string(path.join("keep.txt")).unwrap(), "precious");
        assert!(!path.with_extension("tmp").exists());
    }
}
