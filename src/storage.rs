//! Durable local storage for the persisted build blob.
//!
//! The store writes one JSON document under a fixed key. [`FileStorage`]
//! keeps it on disk; [`MemoryStorage`] backs tests and throwaway sessions.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Key-value storage for serialized state blobs.
pub trait Storage: Send + Sync {
    /// Read the blob stored under `key`, if any.
    fn load(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the blob stored under `key`.
    fn save(&self, key: &str, blob: &str) -> io::Result<()>;
}

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage that already holds `blob` under `key`.
    pub fn with_blob(key: impl Into<String>, blob: impl Into<String>) -> Self {
        let mut blobs = HashMap::new();
        blobs.insert(key.into(), blob.into());
        Self {
            blobs: RwLock::new(blobs),
        }
    }
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "storage lock was poisoned")
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        let blobs = self.blobs.read().map_err(|_| poisoned())?;
        Ok(blobs.get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> io::Result<()> {
        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;
        blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// File-backed storage: each key is stored as `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous blob intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys name a file directly inside `dir`; separators and dot-only
    /// names are rejected.
    fn blob_path(&self, key: &str) -> io::Result<PathBuf> {
        let invalid = key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\'])
            || Path::new(key).is_absolute();
        if invalid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage key '{}'", key),
            ));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.blob_path(key)?;
        match fs::read_to_string(&path) {
            Ok(blob) => {
                tracing::debug!("Loaded {} bytes from {}", blob.len(), path.display());
                Ok(Some(blob))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, key: &str, blob: &str) -> io::Result<()> {
        let path = self.blob_path(key)?;
        let temp_path = path.with_extension("json.tmp");

        fs::write(&temp_path, blob)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved {} bytes to {}", blob.len(), path.display());
        Ok(())
    }
}
