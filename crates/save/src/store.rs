//! Key-value backends for saved data

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

/// String values under string keys, like browser local storage
pub trait SaveStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Volatile store for tests and throwaway runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir`, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| anyhow!("save: create {} failed: {}", dir.display(), e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(anyhow!("save: invalid key {:?}", key));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl SaveStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key)?;
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow!("save: read {} failed: {}", path.display(), e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key)?;
        // Readers never see a partial write
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| anyhow!("save: write {} failed: {}", tmp.display(), e))?;
        fs::rename(&tmp, &path)
            .map_err(|e| anyhow!("save: rename to {} failed: {}", path.display(), e))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow!("save: remove {} failed: {}", path.display(), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_persists_between_handles() {
        let dir = std::env::temp_dir().join(format!("block-riser-store-{}", std::process::id()));
        let mut store = FileStore::open(&dir).unwrap();
        store.set("blockriser-state", "{}").unwrap();

        let reopened = FileStore::open(&dir).unwrap();
        assert_eq!(reopened.get("blockriser-state").unwrap().as_deref(), Some("{}"));

        store.remove("blockriser-state").unwrap();
        store.remove("blockriser-state").unwrap();
        assert_eq!(reopened.get("blockriser-state").unwrap(), None);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = std::env::temp_dir().join(format!("block-riser-keys-{}", std::process::id()));
        let mut store = FileStore::open(&dir).unwrap();
        assert!(store.set("../escape", "x").is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
