//! Export / import of the whole dashboard.
//!
//! An export document snapshots every key of the storage namespace verbatim
//! alongside the bookmark list. Importing restores each key, replaces the
//! list wholesale when the document carries one, and reloads the store.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::bookmark::BookmarkRecord;
use crate::error::DashError;
use crate::storage::KeyValueStorage;
use crate::store::{BookmarkStore, LoadOutcome};

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub export_date: String,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<BookmarkRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub settings_restored: usize,
    /// Number of bookmarks imported, `None` when the document had no list.
    pub links_replaced: Option<usize>,
    pub reload: LoadOutcome,
}

/// Snapshot the namespace and the in-memory list.
pub fn export<S: KeyValueStorage>(
    store: &BookmarkStore<S>,
    now: DateTime<Utc>,
) -> Result<ExportDocument, DashError> {
    let storage = store.storage();
    let mut settings = BTreeMap::new();
    for key in storage.keys()? {
        if let Some(value) = storage.get_item(&key)? {
            settings.insert(key, value);
        }
    }
    Ok(ExportDocument {
        version: EXPORT_VERSION.to_string(),
        export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        settings,
        links: Some(store.records()),
    })
}

pub fn export_json<S: KeyValueStorage>(
    store: &BookmarkStore<S>,
    now: DateTime<Utc>,
) -> Result<String, DashError> {
    let document = export(store, now)?;
    serde_json::to_string_pretty(&document).map_err(|err| DashError::Encode(err.to_string()))
}

/// Parse an export document; nothing is written on failure.
pub fn parse_document(raw: &str) -> Result<ExportDocument, DashError> {
    serde_json::from_str(raw).map_err(|err| DashError::InvalidBackup(err.to_string()))
}

pub fn import<S: KeyValueStorage>(
    store: &mut BookmarkStore<S>,
    raw: &str,
) -> Result<ImportReport, DashError> {
    let document = parse_document(raw)?;
    import_document(store, document)
}

pub fn import_document<S: KeyValueStorage>(
    store: &mut BookmarkStore<S>,
    document: ExportDocument,
) -> Result<ImportReport, DashError> {
    let settings_restored = document.settings.len();
    for (key, value) in &document.settings {
        store.storage_mut().set_item(key, value)?;
    }

    let links_replaced = match document.links {
        Some(links) => {
            let count = links.len();
            store.replace_all(links)?;
            Some(count)
        }
        None => None,
    };

    let reload = store.load()?;
    tracing::info!(
        settings = settings_restored,
        links = links_replaced.unwrap_or(0),
        "imported dashboard backup"
    );
    Ok(ImportReport {
        settings_restored,
        links_replaced,
        reload,
    })
}

/// Default export file name, e.g. `tabdash-backup-2026-01-05.json`.
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("tabdash-backup-{}.json", date.format("%Y-%m-%d"))
}
