//! A [`TokenStore`] backed by a JSON file.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crustline_types::{Codec, JsonCodec};

use crate::{StoreError, TokenStore};

/// Stores tokens as a flat JSON object in a single file.
///
/// The file is created on the first write. A missing file reads as an
/// empty store. Every write rewrites the whole file through a temporary
/// sibling and a rename, so a crash mid-write leaves the old contents.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    /// Creates a store that reads and writes `path`. Touches nothing yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(JsonCodec.decode(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(
        &self,
        entries: &BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let bytes = JsonCodec.encode(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)?;
        tracing::trace!(path = %self.path.display(), key, "token file updated");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_none() {
            return Ok(false);
        }
        self.write_entries(&entries)?;
        tracing::trace!(path = %self.path.display(), key, "token removed from file");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_file_returns_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileTokenStore::new(dir.path().join("tokens.json"));

        assert!(store.get("access_token").unwrap().is_none());
        assert!(!store.path().exists(), "reads must not create the file");
    }

    #[test]
    fn test_set_creates_parent_dirs_and_persists() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("tokens.json");

        FileTokenStore::new(&path).set("access_token", "abc").unwrap();

        // A fresh store on the same path sees the value.
        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.get("access_token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_remove_keeps_other_keys() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileTokenStore::new(dir.path().join("tokens.json"));
        store.set("access_token", "abc").unwrap();
        store.set("cart_id", "c-7").unwrap();

        assert!(store.remove("access_token").unwrap());
        assert!(!store.remove("access_token").unwrap());

        assert!(store.get("access_token").unwrap().is_none());
        assert_eq!(store.get("cart_id").unwrap().as_deref(), Some("c-7"));
    }

    #[test]
    fn test_corrupt_file_returns_codec_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tokens.json");
        fs::write(&path, b"not json at all").unwrap();

        let result = FileTokenStore::new(&path).get("access_token");

        assert!(matches!(result, Err(StoreError::Codec(_))));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tokens.json");

        FileTokenStore::new(&path).set("k", "v").unwrap();

        assert!(!path.with_extension("tmp").exists());
    }
}
