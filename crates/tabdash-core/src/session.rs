//! Modal edit session, form fields, and the per-item context menu.

use crate::bookmark::BookmarkId;

/// Which form, if any, is currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditSession {
    /// Modal closed.
    #[default]
    Idle,
    /// Modal open for a new bookmark.
    Creating,
    /// Modal open for an existing bookmark.
    Editing(BookmarkId),
}

impl EditSession {
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Idle)
    }

    pub fn mode(self) -> Option<FormMode> {
        match self {
            Self::Idle => None,
            Self::Creating => Some(FormMode::Create),
            Self::Editing(_) => Some(FormMode::Edit),
        }
    }

    pub fn editing(self) -> Option<BookmarkId> {
        match self {
            Self::Editing(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

impl FormMode {
    pub fn title(self) -> &'static str {
        match self {
            Self::Create => "Add New Link",
            Self::Edit => "Edit Link",
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            Self::Create => "Add Link",
            Self::Edit => "Save Changes",
        }
    }
}

/// Field values held by the modal form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalForm {
    pub name: String,
    pub url: String,
}

impl ModalForm {
    pub fn reset(&mut self) {
        self.name.clear();
        self.url.clear();
    }
}

/// Target of the per-item context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextMenu {
    #[default]
    Closed,
    Open(BookmarkId),
}

impl ContextMenu {
    pub fn target(self) -> Option<BookmarkId> {
        match self {
            Self::Open(id) => Some(id),
            Self::Closed => None,
        }
    }
}

/// An interaction on a rendered item, addressed by stable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    /// Follow the link.
    Open(BookmarkId),
    Edit(BookmarkId),
    Delete(BookmarkId),
    ContextMenu(BookmarkId),
}

impl ItemAction {
    pub fn target(self) -> BookmarkId {
        match self {
            Self::Open(id) | Self::Edit(id) | Self::Delete(id) | Self::ContextMenu(id) => id,
        }
    }
}

/// Asks the user to approve a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_mode_and_labels() {
        assert_eq!(EditSession::Idle.mode(), None);
        assert!(!EditSession::Idle.is_open());
        assert_eq!(EditSession::Creating.mode(), Some(FormMode::Create));
        let id = BookmarkId::new();
        assert_eq!(EditSession::Editing(id).editing(), Some(id));
        assert_eq!(FormMode::Create.title(), "Add New Link");
        assert_eq!(FormMode::Edit.submit_label(), "Save Changes");
    }

    #[test]
    fn closures_are_confirmers() {
        let mut seen = Vec::new();
        let mut confirm = |prompt: &str| {
            seen.push(prompt.to_string());
            false
        };
        assert!(!Confirm::confirm(&mut confirm, "sure?"));
        assert_eq!(seen, vec!["sure?"]);
    }
}
