//! Shared mock backend for CLI unit tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tabdash_core::{FileStorage, KeyValueStorage};

use crate::{DashBackend, OpenedStorage};

/// Storage lives in a temp dir so every command invocation reopens the same
/// namespace, just like separate runs of the binary.
pub struct MockDashBackend {
    _dir: tempfile::TempDir,
    storage_path: PathBuf,
    quota: Option<usize>,
    answers: RefCell<VecDeque<bool>>,
    pub prompts: RefCell<Vec<String>>,
    pub files: RefCell<BTreeMap<String, String>>,
}

impl MockDashBackend {
    pub fn new() -> Self {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => panic!("tempdir: {err}"),
        };
        let storage_path = dir.path().join("storage.json");
        Self {
            _dir: dir,
            storage_path,
            quota: None,
            answers: RefCell::new(VecDeque::new()),
            prompts: RefCell::new(Vec::new()),
            files: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::new()
        }
    }

    /// Queue answers for upcoming confirmation prompts. Unqueued prompts answer no.
    pub fn answer(&self, answers: &[bool]) {
        self.answers.borrow_mut().extend(answers.iter().copied());
    }

    pub fn seed(&self, key: &str, value: &str) {
        let mut storage = self.open_file_storage();
        if let Err(err) = storage.set_item(key, value) {
            panic!("seed {key}: {err}");
        }
    }

    pub fn stored(&self, key: &str) -> Option<String> {
        self.open_file_storage().get_item(key).ok().flatten()
    }

    /// Overwrite the namespace file with raw bytes.
    pub fn write_namespace(&self, raw: &str) {
        if let Err(err) = std::fs::write(&self.storage_path, raw) {
            panic!("write namespace: {err}");
        }
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    fn open_file_storage(&self) -> FileStorage {
        match FileStorage::open(&self.storage_path, self.quota) {
            Ok(storage) => storage,
            Err(err) => panic!("open storage: {err}"),
        }
    }
}

impl DashBackend for MockDashBackend {
    fn open_storage(&self) -> Result<OpenedStorage, String> {
        OpenedStorage::open_file(&self.storage_path, self.quota)
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.answers.borrow_mut().pop_front().unwrap_or(false)
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 9, 7, 3)
            .single()
            .unwrap_or_else(Utc::now)
    }

    fn now_local(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .and_then(|d| d.and_hms_opt(14, 5, 9))
            .unwrap_or_default()
    }

    fn read_file(&self, path: &str) -> Result<String, String> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| format!("read {path}: not found"))
    }

    fn write_file(&self, path: &str, contents: &str) -> Result<(), String> {
        self.files
            .borrow_mut()
            .insert(path.to_string(), contents.to_string());
        Ok(())
    }
}
