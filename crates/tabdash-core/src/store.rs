//! Bookmark store and modal editor.
//!
//! [`BookmarkStore`] owns the ordered bookmark list together with the edit
//! session, the form fields, and the context-menu target, and keeps the list
//! in sync with the `savedLinks` key of the storage namespace. The entire
//! list is re-serialized after every create, update, and delete.
//!
//! Mutations are staged on a copy of the list and committed only after the
//! write succeeds, so a failed write leaves the in-memory list, the open
//! form, and its input exactly as they were.

use crate::bookmark::{normalize_url, Bookmark, BookmarkId, BookmarkRecord};
use crate::error::DashError;
use crate::render::{render_list, RenderedList};
use crate::session::{Confirm, ContextMenu, EditSession, ItemAction, ModalForm};
use crate::storage::KeyValueStorage;

/// Storage key holding the serialized bookmark list.
pub const SAVED_LINKS_KEY: &str = "savedLinks";

/// Where an unparseable `savedLinks` value is copied before it is discarded.
pub const CORRUPT_LINKS_KEY: &str = "savedLinks.corrupt";

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this link?";

/// Result of [`BookmarkStore::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored yet.
    Empty,
    Loaded(usize),
    /// Stored data was malformed; the list starts empty.
    Discarded {
        reason: String,
        /// Key the raw blob was copied to, if the copy succeeded.
        preserved_as: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(BookmarkId),
    Updated(BookmarkId),
}

impl SubmitOutcome {
    pub fn id(self) -> BookmarkId {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Bookmark),
    /// The user declined the confirmation.
    Declined,
}

/// Result of [`BookmarkStore::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Follow this url.
    Navigate(String),
    EditFormOpened(BookmarkId),
    ContextMenuOpened(BookmarkId),
    Delete(DeleteOutcome),
}

#[derive(Debug)]
pub struct BookmarkStore<S> {
    storage: S,
    bookmarks: Vec<Bookmark>,
    session: EditSession,
    form: ModalForm,
    context: ContextMenu,
    filter: String,
}

impl<S: KeyValueStorage> BookmarkStore<S> {
    /// A store with an empty, not yet loaded list.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            bookmarks: Vec::new(),
            session: EditSession::Idle,
            form: ModalForm::default(),
            context: ContextMenu::Closed,
            filter: String::new(),
        }
    }

    /// Create a store and load the persisted list.
    pub fn open(storage: S) -> Result<(Self, LoadOutcome), DashError> {
        let mut store = Self::new(storage);
        let outcome = store.load()?;
        Ok((store, outcome))
    }

    // -- accessors -----------------------------------------------------------

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn get(&self, id: BookmarkId) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.id == id)
    }

    pub fn position_of(&self, id: BookmarkId) -> Option<usize> {
        self.bookmarks.iter().position(|b| b.id == id)
    }

    /// Id of the entry at `index`, failing fast when out of range.
    pub fn id_at(&self, index: usize) -> Result<BookmarkId, DashError> {
        self.bookmarks
            .get(index)
            .map(|b| b.id)
            .ok_or(DashError::IndexOutOfRange {
                index,
                len: self.bookmarks.len(),
            })
    }

    pub fn records(&self) -> Vec<BookmarkRecord> {
        self.bookmarks.iter().map(Bookmark::to_record).collect()
    }

    pub fn session(&self) -> EditSession {
        self.session
    }

    pub fn form(&self) -> &ModalForm {
        &self.form
    }

    pub fn context_menu(&self) -> ContextMenu {
        self.context
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    // -- load / persist --------------------------------------------------------

    /// Replace the in-memory list with the persisted one.
    ///
    /// Malformed data never fails the load: the list starts empty and the raw
    /// value is copied to [`CORRUPT_LINKS_KEY`] so it can be recovered by hand.
    pub fn load(&mut self) -> Result<LoadOutcome, DashError> {
        self.close_form();
        self.context = ContextMenu::Closed;

        let Some(raw) = self.storage.get_item(SAVED_LINKS_KEY)? else {
            self.bookmarks.clear();
            tracing::debug!("no saved bookmarks");
            return Ok(LoadOutcome::Empty);
        };

        match serde_json::from_str::<Vec<BookmarkRecord>>(&raw) {
            Ok(records) => {
                self.bookmarks = records.into_iter().map(Bookmark::from_record).collect();
                tracing::debug!(count = self.bookmarks.len(), "loaded bookmarks");
                Ok(LoadOutcome::Loaded(self.bookmarks.len()))
            }
            Err(err) => {
                self.bookmarks.clear();
                let reason = err.to_string();
                let preserved_as = match self.storage.set_item(CORRUPT_LINKS_KEY, &raw) {
                    Ok(()) => Some(CORRUPT_LINKS_KEY.to_string()),
                    Err(copy_err) => {
                        tracing::warn!(error = %copy_err, "could not preserve malformed bookmarks");
                        None
                    }
                };
                tracing::warn!(
                    error = %reason,
                    preserved_as = preserved_as.as_deref().unwrap_or("-"),
                    "saved bookmarks are malformed; starting with an empty list"
                );
                Ok(LoadOutcome::Discarded {
                    reason,
                    preserved_as,
                })
            }
        }
    }

    fn persist(&mut self, bookmarks: &[Bookmark]) -> Result<(), DashError> {
        let records: Vec<BookmarkRecord> = bookmarks.iter().map(Bookmark::to_record).collect();
        let encoded =
            serde_json::to_string(&records).map_err(|err| DashError::Encode(err.to_string()))?;
        self.storage
            .set_item(SAVED_LINKS_KEY, &encoded)
            .map_err(|err| {
                tracing::warn!(error = %err, "failed to persist bookmarks");
                DashError::from(err)
            })?;
        tracing::debug!(count = records.len(), "persisted bookmarks");
        Ok(())
    }

    // -- modal form ------------------------------------------------------------

    /// Open the form for a new bookmark, discarding any open session.
    pub fn open_create_form(&mut self) {
        self.close_form();
        self.session = EditSession::Creating;
    }

    /// Open the form pre-filled with bookmark `id`.
    pub fn open_edit_form(&mut self, id: BookmarkId) -> Result<(), DashError> {
        let bookmark = self.get(id).ok_or(DashError::UnknownBookmark(id))?;
        let (name, url) = (bookmark.name.clone(), bookmark.url.clone());
        self.close_form();
        self.form.name = name;
        self.form.url = url;
        self.session = EditSession::Editing(id);
        Ok(())
    }

    pub fn open_edit_form_at(&mut self, index: usize) -> Result<(), DashError> {
        let id = self.id_at(index)?;
        self.open_edit_form(id)
    }

    /// Close the form without touching the list.
    pub fn cancel(&mut self) {
        self.close_form();
    }

    fn close_form(&mut self) {
        self.session = EditSession::Idle;
        self.form.reset();
    }

    /// Save the form: append in create mode, replace in place in edit mode.
    pub fn submit(&mut self, name: &str, url: &str) -> Result<SubmitOutcome, DashError> {
        if !self.session.is_open() {
            return Err(DashError::FormClosed);
        }
        self.form.name = name.to_string();
        self.form.url = url.to_string();

        let url = normalize_url(url);
        let mut next = self.bookmarks.clone();
        let outcome = match self.session {
            EditSession::Editing(id) => {
                let pos = self.position_of(id).ok_or(DashError::UnknownBookmark(id))?;
                next[pos].name = name.to_string();
                next[pos].url = url;
                SubmitOutcome::Updated(id)
            }
            EditSession::Creating | EditSession::Idle => {
                let bookmark = Bookmark {
                    id: BookmarkId::new(),
                    name: name.to_string(),
                    url,
                };
                let id = bookmark.id;
                next.push(bookmark);
                SubmitOutcome::Created(id)
            }
        };

        self.persist(&next)?;
        self.bookmarks = next;
        self.close_form();
        Ok(outcome)
    }

    // -- delete ----------------------------------------------------------------

    /// Remove bookmark `id` once `confirm` approves.
    pub fn delete(
        &mut self,
        id: BookmarkId,
        confirm: &mut dyn Confirm,
    ) -> Result<DeleteOutcome, DashError> {
        let pos = self.position_of(id).ok_or(DashError::UnknownBookmark(id))?;
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(DeleteOutcome::Declined);
        }

        let mut next = self.bookmarks.clone();
        let removed = next.remove(pos);
        self.persist(&next)?;
        self.bookmarks = next;

        if self.session.editing() == Some(id) {
            self.close_form();
        }
        self.context = ContextMenu::Closed;
        Ok(DeleteOutcome::Deleted(removed))
    }

    pub fn delete_at(
        &mut self,
        index: usize,
        confirm: &mut dyn Confirm,
    ) -> Result<DeleteOutcome, DashError> {
        let id = self.id_at(index)?;
        self.delete(id, confirm)
    }

    // -- context menu ----------------------------------------------------------

    pub fn open_context_menu(&mut self, id: BookmarkId) -> Result<(), DashError> {
        if self.position_of(id).is_none() {
            return Err(DashError::UnknownBookmark(id));
        }
        self.context = ContextMenu::Open(id);
        Ok(())
    }

    pub fn close_context_menu(&mut self) {
        self.context = ContextMenu::Closed;
    }

    /// "Edit" entry of the context menu.
    pub fn context_edit(&mut self) -> Result<(), DashError> {
        let id = self.context.target().ok_or(DashError::NoContextTarget)?;
        self.context = ContextMenu::Closed;
        self.open_edit_form(id)
    }

    /// "Delete" entry of the context menu.
    pub fn context_delete(&mut self, confirm: &mut dyn Confirm) -> Result<DeleteOutcome, DashError> {
        let id = self.context.target().ok_or(DashError::NoContextTarget)?;
        self.context = ContextMenu::Closed;
        self.delete(id, confirm)
    }

    /// Route an interaction on a rendered item.
    pub fn dispatch(
        &mut self,
        action: ItemAction,
        confirm: &mut dyn Confirm,
    ) -> Result<ActionOutcome, DashError> {
        match action {
            ItemAction::Open(id) => {
                let bookmark = self.get(id).ok_or(DashError::UnknownBookmark(id))?;
                Ok(ActionOutcome::Navigate(bookmark.url.clone()))
            }
            ItemAction::Edit(id) => {
                self.open_edit_form(id)?;
                Ok(ActionOutcome::EditFormOpened(id))
            }
            ItemAction::Delete(id) => self.delete(id, confirm).map(ActionOutcome::Delete),
            ItemAction::ContextMenu(id) => {
                self.open_context_menu(id)?;
                Ok(ActionOutcome::ContextMenuOpened(id))
            }
        }
    }

    // -- bulk ------------------------------------------------------------------

    /// Replace the whole list (import path). Entries get fresh ids.
    pub fn replace_all(&mut self, records: Vec<BookmarkRecord>) -> Result<(), DashError> {
        let next: Vec<Bookmark> = records.into_iter().map(Bookmark::from_record).collect();
        self.persist(&next)?;
        self.bookmarks = next;
        self.close_form();
        self.context = ContextMenu::Closed;
        Ok(())
    }

    pub fn render(&self) -> RenderedList {
        render_list(&self.bookmarks)
    }

    // -- name filter -------------------------------------------------------------

    /// Show only bookmarks whose name contains `query`, ignoring case.
    pub fn set_filter(&mut self, query: &str) {
        self.filter = query.to_string();
    }

    /// Escape in the filter box: every bookmark is shown again.
    pub fn clear_filter(&mut self) {
        self.filter.clear();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// The rendered list with the current filter applied.
    pub fn render_visible(&self) -> RenderedList {
        self.render().filtered(&self.filter)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn yes(_: &str) -> bool {
        true
    }

    fn store_with(names: &[&str]) -> BookmarkStore<MemoryStorage> {
        let mut store = BookmarkStore::new(MemoryStorage::new());
        for name in names {
            store.open_create_form();
            store
                .submit(name, &format!("{}.example", name.to_lowercase()))
                .unwrap();
        }
        store
    }

    #[test]
    fn submit_without_open_form_is_rejected() {
        let mut store = store_with(&[]);
        assert_eq!(store.submit("x", "y"), Err(DashError::FormClosed));
        assert!(store.is_empty());
    }

    #[test]
    fn opening_a_form_resets_previous_session() {
        let mut store = store_with(&["A"]);
        let id = store.id_at(0).unwrap();
        store.open_edit_form(id).unwrap();
        assert_eq!(store.form().name, "A");

        store.open_create_form();
        assert_eq!(store.session(), EditSession::Creating);
        assert_eq!(store.form(), &ModalForm::default());
    }

    #[test]
    fn out_of_range_index_fails_fast() {
        let mut store = store_with(&["A"]);
        assert_eq!(
            store.open_edit_form_at(3),
            Err(DashError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert_eq!(store.session(), EditSession::Idle);
        assert_eq!(
            store.delete_at(1, &mut yes),
            Err(DashError::IndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn deleting_the_edit_target_closes_the_form() {
        let mut store = store_with(&["A", "B"]);
        let a = store.id_at(0).unwrap();
        store.open_edit_form(a).unwrap();
        store.delete(a, &mut yes).unwrap();
        assert_eq!(store.session(), EditSession::Idle);
        assert_eq!(store.submit("A2", "a2"), Err(DashError::FormClosed));
    }

    #[test]
    fn deleting_a_sibling_keeps_the_edit_target() {
        let mut store = store_with(&["A", "B", "C"]);
        let a = store.id_at(0).unwrap();
        let c = store.id_at(2).unwrap();
        store.open_edit_form(c).unwrap();
        store.delete(a, &mut yes).unwrap();
        assert_eq!(store.session(), EditSession::Editing(c));
        store.submit("C2", "c2.example").unwrap();
        assert_eq!(store.bookmarks()[1].name, "C2");
        assert_eq!(store.bookmarks()[1].id, c);
    }

    #[test]
    fn context_menu_requires_a_target() {
        let mut store = store_with(&["A"]);
        assert_eq!(store.context_edit(), Err(DashError::NoContextTarget));
        assert_eq!(
            store.context_delete(&mut yes),
            Err(DashError::NoContextTarget)
        );

        let a = store.id_at(0).unwrap();
        store.open_context_menu(a).unwrap();
        store.context_edit().unwrap();
        assert_eq!(store.context_menu(), ContextMenu::Closed);
        assert_eq!(store.session(), EditSession::Editing(a));
    }

    #[test]
    fn dispatch_routes_by_id() {
        let mut store = store_with(&["A", "B"]);
        let b = store.id_at(1).unwrap();
        assert_eq!(
            store.dispatch(ItemAction::Open(b), &mut yes).unwrap(),
            ActionOutcome::Navigate("https://b.example".into())
        );
        assert_eq!(
            store.dispatch(ItemAction::ContextMenu(b), &mut yes).unwrap(),
            ActionOutcome::ContextMenuOpened(b)
        );
        assert_eq!(store.context_menu(), ContextMenu::Open(b));
        let outcome = store.dispatch(ItemAction::Delete(b), &mut yes).unwrap();
        assert!(matches!(outcome, ActionOutcome::Delete(DeleteOutcome::Deleted(ref gone)) if gone.id == b));
        assert_eq!(store.context_menu(), ContextMenu::Closed);
        assert_eq!(
            store.dispatch(ItemAction::Edit(b), &mut yes),
            Err(DashError::UnknownBookmark(b))
        );
    }

    #[test]
    fn stale_edit_session_after_replace_is_closed() {
        let mut store = store_with(&["A"]);
        store.open_edit_form_at(0).unwrap();
        store
            .replace_all(vec![BookmarkRecord::new("Z", "https://z")])
            .unwrap();
        assert_eq!(store.session(), EditSession::Idle);
        assert_eq!(store.records(), vec![BookmarkRecord::new("Z", "https://z")]);
    }

    #[test]
    fn filter_hides_non_matching_names_until_cleared() {
        let mut store = store_with(&["Alpha", "Beta", "alphabet"]);
        store.set_filter("ALPHA");
        let visible: Vec<String> = store
            .render_visible()
            .items
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(visible, ["Alpha", "alphabet"]);

        // New entries go through the same filter.
        store.open_create_form();
        store.submit("Gamma", "gamma.example").unwrap();
        assert_eq!(store.render_visible().len(), 2);

        store.clear_filter();
        assert_eq!(store.filter(), "");
        assert_eq!(store.render_visible(), store.render());
    }
}
