//! Clear-all-data control.

use crate::error::DashError;
use crate::session::Confirm;
use crate::storage::KeyValueStorage;
use crate::store::BookmarkStore;

pub const CLEAR_WARNING_PROMPT: &str = "WARNING: This will delete ALL your data including:\n\
• Bookmarks\n\
• Settings\n\
• Themes\n\
• Background preferences\n\n\
This action cannot be undone. Continue?";

pub const CLEAR_FINAL_PROMPT: &str = "Are you absolutely sure? This cannot be undone!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared { keys_removed: usize },
    Declined,
}

/// Wipe the whole namespace after two confirmations, then reload the store.
pub fn clear_all_data<S: KeyValueStorage>(
    store: &mut BookmarkStore<S>,
    confirm: &mut dyn Confirm,
) -> Result<ClearOutcome, DashError> {
    if !confirm.confirm(CLEAR_WARNING_PROMPT) || !confirm.confirm(CLEAR_FINAL_PROMPT) {
        return Ok(ClearOutcome::Declined);
    }
    let keys_removed = store.storage().keys()?.len();
    store.storage_mut().clear()?;
    store.load()?;
    tracing::info!(keys_removed, "cleared all dashboard data");
    Ok(ClearOutcome::Cleared { keys_removed })
}
