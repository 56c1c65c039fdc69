//! JSON-document-backed record storage.
//!
//! Each collection lives in one pretty-printed JSON file that is read once at
//! startup and rewritten in full after every successful mutation.

use crate::shared::errors::StorageError;
use crate::shared::paths::ensure_dir;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory collection with whole-document file persistence.
pub struct JsonStore<T> {
    path: PathBuf,
    data: RwLock<T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default + Clone,
{
    /// Opens the store, loading the backing document (or the empty default).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = load::<T>(&path);
        Self {
            path,
            data: RwLock::new(data),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes `data` to the backing document without touching the in-memory copy.
    pub(crate) fn persist(&self, data: &T) -> Result<(), StorageError> {
        save(&self.path, data)
    }

    /// Applies `f` to a draft of the collection and commits it after a
    /// successful save.
    ///
    /// If `f` or the save fails, neither memory nor disk changes.
    pub fn mutate<R, E>(&self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StorageError>,
    {
        let mut guard = self.write();
        let mut draft = guard.clone();
        let result = f(&mut draft)?;
        save(&self.path, &draft)?;
        *guard = draft;
        Ok(result)
    }

    /// Like [`JsonStore::mutate`], but `f` returning `None` means nothing
    /// changed and no write happens.
    pub fn mutate_if<R, E>(&self, f: impl FnOnce(&mut T) -> Result<Option<R>, E>) -> Result<Option<R>, E>
    where
        E: From<StorageError>,
    {
        let mut guard = self.write();
        let mut draft = guard.clone();
        let Some(result) = f(&mut draft)? else {
            return Ok(None);
        };
        save(&self.path, &draft)?;
        *guard = draft;
        Ok(Some(result))
    }
}

/// Loads a document, falling back to the empty default.
///
/// A malformed document is moved aside to `<name>.corrupt.json` so the next
/// save cannot overwrite it.
pub fn load<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_from_file(path) {
        Ok(Some(data)) => data,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(
                target: "system",
                path = %path.display(),
                "Failed to load document, starting empty: {}",
                e
            );
            quarantine(path);
            T::default()
        }
    }
}

fn load_from_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let data = serde_json::from_str(&content)?;
    Ok(Some(data))
}

fn quarantine(path: &Path) {
    let backup = path.with_extension("corrupt.json");
    match std::fs::rename(path, &backup) {
        Ok(()) => tracing::warn!(
            target: "system",
            "Malformed document moved to {:?}",
            backup
        ),
        Err(e) => tracing::error!(
            target: "system",
            path = %path.display(),
            "Could not move malformed document aside: {}",
            e
        ),
    }
}

/// Serializes `data` and replaces the document at `path`.
///
/// The content goes to a sibling temp file first and is renamed into place.
pub fn save<T: Serialize>(path: &Path, data: &T) -> Result<(), StorageError> {
    if let Some(dir) = path.parent() {
        ensure_dir(dir)
            .map_err(|e| StorageError::directory(format!("{}: {}", dir.display(), e)))?;
    }

    let content = serde_json::to_string_pretty(data)?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    tracing::trace!(target: "system", path = %path.display(), "Document saved");
    Ok(())
}
