//! Error types for the dashboard core.
//!
//! Every failure here is recoverable: callers get the error back with the
//! in-memory state left as it was before the failing operation.

use crate::bookmark::BookmarkId;

/// Failures raised by a [`crate::storage::KeyValueStorage`] backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Writing `key` would push the namespace past its byte quota.
    #[error("storage quota exceeded writing {key:?}: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    #[error("storage io: {0}")]
    Io(String),
    /// The namespace file exists but cannot be parsed.
    #[error("storage namespace corrupt: {0}")]
    Corrupt(String),
    #[error("encode storage namespace: {0}")]
    Encode(String),
}

/// Errors returned by bookmark store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("bookmark index {index} out of range (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("bookmark {0} not found")]
    UnknownBookmark(BookmarkId),

    /// `submit` was called while no form is open.
    #[error("no bookmark form is open")]
    FormClosed,

    #[error("no context menu is open")]
    NoContextTarget,

    #[error("encode bookmarks: {0}")]
    Encode(String),

    #[error("invalid backup file: {0}")]
    InvalidBackup(String),
}

impl DashError {
    /// Whether the failure came from the storage layer rather than the caller.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_convert_and_classify() {
        let err: DashError = StorageError::Io("disk gone".into()).into();
        assert!(err.is_storage());
        assert_eq!(err.to_string(), "storage io: disk gone");
        assert!(!DashError::FormClosed.is_storage());
    }

    #[test]
    fn index_error_message_names_bounds() {
        let err = DashError::IndexOutOfRange { index: 4, len: 2 };
        assert_eq!(
            err.to_string(),
            "bookmark index 4 out of range (list has 2 entries)"
        );
    }
}
