//! The shared key-value storage namespace.
//!
//! Every dashboard widget reads and writes string values under string keys in
//! one namespace, the way browser `localStorage` behaves. The bookmark store
//! only touches [`crate::store::SAVED_LINKS_KEY`]; preferences use their own
//! keys (see [`crate::prefs`]).

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::StorageError;

/// Default namespace quota, matching the common browser limit.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

static TEMP_SUFFIX_COUNTER: AtomicU64 = AtomicU64::new(0);

/// String-keyed, string-valued persistent storage.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
    /// All keys currently present, sorted.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Box<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for &mut T {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

/// Bytes charged against the quota for a set of items.
fn namespace_size(items: &BTreeMap<String, String>) -> usize {
    items.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// Size the namespace would have after setting `key` to `value`.
fn size_after_set(items: &BTreeMap<String, String>, key: &str, value: &str) -> usize {
    let current = namespace_size(items);
    let replaced = items.get(key).map(|old| key.len() + old.len()).unwrap_or(0);
    current - replaced + key.len() + value.len()
}

fn check_quota(
    items: &BTreeMap<String, String>,
    quota: Option<usize>,
    key: &str,
    value: &str,
) -> Result<(), StorageError> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let needed = size_after_set(items, key, value);
    if needed > quota {
        return Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            needed,
            quota,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// In-process namespace. Used by tests and by callers that do not persist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A namespace that rejects writes past `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: BTreeMap::new(),
            quota: Some(quota),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(&self.items, self.quota, key, value)?;
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.items.keys().cloned().collect())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// An unreadable namespace file that [`FileStorage::open_or_recover`] moved aside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredNamespace {
    pub reason: String,
    pub preserved_as: PathBuf,
}

/// Namespace persisted as a single JSON object file.
///
/// The file is read once at [`FileStorage::open`]; every mutation rewrites it
/// through a temp file and a rename, so readers never observe a partial write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl FileStorage {
    /// Open (or lazily create) the namespace at `path`.
    pub fn open(path: &Path, quota: Option<usize>) -> Result<Self, StorageError> {
        let items = match fs::read_to_string(path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str::<BTreeMap<String, String>>(&raw)
                .map_err(|err| StorageError::Corrupt(format!("{}: {err}", path.display())))?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(StorageError::Io(format!(
                    "read {}: {err}",
                    path.display()
                )))
            }
        };
        tracing::debug!(path = %path.display(), keys = items.len(), "opened storage namespace");
        Ok(Self {
            path: path.to_path_buf(),
            items,
            quota,
        })
    }

    /// Like [`FileStorage::open`], but a namespace file that does not parse is
    /// moved aside and replaced by an empty namespace.
    ///
    /// The second element reports where the unreadable file went. Io failures
    /// are still returned as errors.
    pub fn open_or_recover(
        path: &Path,
        quota: Option<usize>,
    ) -> Result<(Self, Option<RecoveredNamespace>), StorageError> {
        let reason = match Self::open(path, quota) {
            Ok(storage) => return Ok((storage, None)),
            Err(StorageError::Corrupt(reason)) => reason,
            Err(err) => return Err(err),
        };

        let preserved_as = corrupt_path(path);
        fs::rename(path, &preserved_as).map_err(|err| {
            StorageError::Io(format!(
                "move corrupt namespace {} -> {}: {err}",
                path.display(),
                preserved_as.display()
            ))
        })?;
        tracing::warn!(
            error = %reason,
            preserved_as = %preserved_as.display(),
            "storage namespace is corrupt; starting with an empty namespace"
        );

        let storage = Self {
            path: path.to_path_buf(),
            items: BTreeMap::new(),
            quota,
        };
        Ok((
            storage,
            Some(RecoveredNamespace {
                reason,
                preserved_as,
            }),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn commit(&mut self, next: BTreeMap<String, String>) -> Result<(), StorageError> {
        persist_namespace(&self.path, &next)?;
        self.items = next;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(&self.items, self.quota, key, value)?;
        let mut next = self.items.clone();
        next.insert(key.to_string(), value.to_string());
        self.commit(next)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if !self.items.contains_key(key) {
            return Ok(());
        }
        let mut next = self.items.clone();
        next.remove(key);
        self.commit(next)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.items.keys().cloned().collect())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.commit(BTreeMap::new())
    }
}

fn persist_namespace(path: &Path, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
    let serialized =
        serde_json::to_string_pretty(items).map_err(|err| StorageError::Encode(err.to_string()))?;
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            StorageError::Io(format!("create storage directory {}: {err}", parent.display()))
        })?;
    }

    let temp = temp_path(path);
    write_file_synced(&temp, serialized.as_bytes())?;
    if let Err(err) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(StorageError::Io(format!(
            "rename {} -> {}: {err}",
            temp.display(),
            path.display()
        )));
    }
    Ok(())
}

fn write_file_synced(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .map_err(|err| StorageError::Io(format!("open {}: {err}", path.display())))?;
    file.write_all(bytes)
        .map_err(|err| StorageError::Io(format!("write {}: {err}", path.display())))?;
    file.sync_all()
        .map_err(|err| StorageError::Io(format!("sync {}: {err}", path.display())))?;
    Ok(())
}

/// First free `<path>.corrupt`, `<path>.corrupt.1`, ... so earlier copies survive.
fn corrupt_path(path: &Path) -> PathBuf {
    let mut base = path.as_os_str().to_os_string();
    base.push(".corrupt");
    let first = PathBuf::from(&base);
    if !first.exists() {
        return first;
    }
    let mut n: u32 = 1;
    loop {
        let mut raw = base.clone();
        raw.push(format!(".{n}"));
        let candidate = PathBuf::from(raw);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let pid = std::process::id();
    let suffix = TEMP_SUFFIX_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut raw = path.as_os_str().to_os_string();
    raw.push(format!(".tmp-{pid}-{suffix}"));
    PathBuf::from(raw)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_basic_operations() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get_item("a").unwrap(), None);
        storage.set_item("b", "2").unwrap();
        storage.set_item("a", "1").unwrap();
        assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.keys().unwrap(), vec!["a", "b"]);
        storage.remove_item("a").unwrap();
        assert_eq!(storage.len(), 1);
        storage.clear().unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn quota_counts_replacement_not_accumulation() {
        let mut storage = MemoryStorage::with_quota(10);
        storage.set_item("k", "123456789").unwrap();
        // Replacing the same key with an equal-size value fits.
        storage.set_item("k", "987654321").unwrap();
        let err = storage.set_item("k", "1234567890").unwrap_err();
        assert_eq!(
            err,
            StorageError::QuotaExceeded {
                key: "k".into(),
                needed: 11,
                quota: 10
            }
        );
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("987654321"));
    }

    #[test]
    fn boxed_and_borrowed_storage_forward_calls() {
        fn write_through<S: KeyValueStorage>(mut storage: S) {
            storage.set_item("x", "1").unwrap();
        }

        let mut inner = MemoryStorage::new();
        write_through(&mut inner);
        let mut boxed: Box<dyn KeyValueStorage> = Box::new(inner);
        assert_eq!(boxed.get_item("x").unwrap().as_deref(), Some("1"));
        boxed.clear().unwrap();
        assert!(boxed.keys().unwrap().is_empty());
    }

    #[test]
    fn temp_paths_are_unique_siblings() {
        let base = Path::new("/tmp/storage.json");
        let a = temp_path(base);
        let b = temp_path(base);
        assert_ne!(a, b);
        assert_eq!(a.parent(), base.parent());
    }
}
