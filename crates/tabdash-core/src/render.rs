//! Render model for the bookmark list.
//!
//! Rendering is a pure function of the list: the whole output is rebuilt on
//! every call and the same list always yields the same items.

use serde::Serialize;

use crate::bookmark::{favicon_src, Bookmark, BookmarkId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedItem {
    pub id: BookmarkId,
    /// Zero-based display position.
    pub position: usize,
    pub name: String,
    pub href: String,
    /// Favicon image source; `None` when the url has no parseable hostname.
    pub favicon_src: Option<String>,
    /// Shown whenever the favicon cannot be displayed.
    pub fallback_glyph: String,
}

impl RenderedItem {
    /// What the icon slot displays when no favicon image is available.
    pub fn icon_text(&self) -> &str {
        &self.fallback_glyph
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedList {
    pub items: Vec<RenderedItem>,
}

impl RenderedList {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: BookmarkId) -> Option<&RenderedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items whose name contains `query`, ignoring case.
    ///
    /// Kept items retain their position in the full list. An empty query
    /// keeps every item.
    pub fn filtered(&self, query: &str) -> RenderedList {
        let needle = query.to_lowercase();
        let items = self
            .items
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        RenderedList { items }
    }
}

pub fn render_list(bookmarks: &[Bookmark]) -> RenderedList {
    let items = bookmarks
        .iter()
        .enumerate()
        .map(|(position, bookmark)| RenderedItem {
            id: bookmark.id,
            position,
            name: bookmark.name.clone(),
            href: bookmark.url.clone(),
            favicon_src: favicon_src(&bookmark.url),
            fallback_glyph: bookmark.fallback_glyph(),
        })
        .collect();
    RenderedList { items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmark::BookmarkRecord;

    fn sample() -> Vec<Bookmark> {
        vec![
            Bookmark::from_record(BookmarkRecord::new("Mail", "https://mail.com")),
            Bookmark::from_record(BookmarkRecord::new("", "ftp://files.example")),
            Bookmark::from_record(BookmarkRecord::new("odd", "https://")),
        ]
    }

    #[test]
    fn render_assigns_positions_and_icons() {
        let list = render_list(&sample());
        assert_eq!(list.len(), 3);
        assert_eq!(list.items[0].position, 0);
        assert_eq!(list.items[0].fallback_glyph, "M");
        assert_eq!(
            list.items[0].favicon_src.as_deref(),
            Some("https://www.google.com/s2/favicons?domain=mail.com&sz=64")
        );
        assert_eq!(list.items[1].fallback_glyph, "?");
        assert_eq!(list.items[1].icon_text(), "?");
        assert_eq!(list.items[2].favicon_src, None);
        assert_eq!(list.items[2].fallback_glyph, "O");
    }

    #[test]
    fn render_is_idempotent() {
        let bookmarks = sample();
        assert_eq!(render_list(&bookmarks), render_list(&bookmarks));
    }

    #[test]
    fn filter_matches_name_substring_ignoring_case() {
        let bookmarks = vec![
            Bookmark::from_record(BookmarkRecord::new("GitHub", "https://github.com")),
            Bookmark::from_record(BookmarkRecord::new("Mail", "https://mail.com")),
            Bookmark::from_record(BookmarkRecord::new("gitlab", "https://hub.example")),
        ];
        let list = render_list(&bookmarks);

        let hits = list.filtered("GIT");
        let names: Vec<&str> = hits.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["GitHub", "gitlab"]);
        assert_eq!(hits.items[1].position, 2);

        // Urls are not searched.
        assert!(list.filtered("hub.example").is_empty());
        assert_eq!(list.filtered(""), list);
    }

    #[test]
    fn find_by_id() {
        let bookmarks = sample();
        let list = render_list(&bookmarks);
        let found = list.find(bookmarks[1].id).map(|item| item.position);
        assert_eq!(found, Some(1));
    }
}
