//! tabdash-core: state and persistence for the tabdash new-tab dashboard.
//!
//! The heart of the crate is [`store::BookmarkStore`], which owns the ordered
//! bookmark list, the modal edit session, and the context menu, and persists
//! the list into a shared [`storage::KeyValueStorage`] namespace. Sibling
//! widgets (theme, clock, background, search engine) live in [`prefs`] and
//! the quote picker in [`quotes`]; whole-dashboard export/import and the
//! clear-all control live in [`backup`] and [`privacy`].

pub mod backup;
pub mod bookmark;
pub mod error;
pub mod prefs;
pub mod privacy;
pub mod quotes;
pub mod render;
pub mod session;
pub mod storage;
pub mod store;

pub use bookmark::{Bookmark, BookmarkId, BookmarkRecord};
pub use error::{DashError, StorageError};
pub use session::{Confirm, ContextMenu, EditSession, FormMode, ItemAction, ModalForm};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, RecoveredNamespace};
pub use store::{BookmarkStore, DeleteOutcome, LoadOutcome, SubmitOutcome};

/// Crate identity label.
pub fn crate_label() -> &'static str {
    "tabdash-core"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "tabdash-core");
    }
}
