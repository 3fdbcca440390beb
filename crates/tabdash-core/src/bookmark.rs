//! Bookmark entries and the small pure rules applied to them.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Favicon service queried per rendered item.
pub const FAVICON_ENDPOINT: &str = "https://www.google.com/s2/favicons";

/// Stable identity of an in-memory bookmark.
///
/// Ids are assigned when an entry enters the list and are not persisted, so
/// they are only meaningful for the lifetime of one loaded store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BookmarkId(Uuid);

impl BookmarkId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for BookmarkId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted shape of one bookmark: `{"name": ..., "url": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl BookmarkRecord {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// A bookmark held in the store's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub name: String,
    pub url: String,
}

impl Bookmark {
    pub fn from_record(record: BookmarkRecord) -> Self {
        Self {
            id: BookmarkId::new(),
            name: record.name,
            url: record.url,
        }
    }

    pub fn to_record(&self) -> BookmarkRecord {
        BookmarkRecord {
            name: self.name.clone(),
            url: self.url.clone(),
        }
    }

    /// Uppercased first character of the name, `?` when the name is empty.
    pub fn fallback_glyph(&self) -> String {
        fallback_glyph(&self.name)
    }
}

/// Prefix `https://` onto values that carry no scheme.
///
/// This is a string-prefix check, not a URL parse. Values already starting
/// with `http://` or `https://` are kept, and so are values with some other
/// `scheme://` prefix or a scheme-relative `//` prefix: those are stored as
/// typed rather than corrected.
pub fn normalize_url(raw: &str) -> String {
    if raw.starts_with("http://")
        || raw.starts_with("https://")
        || raw.starts_with("//")
        || has_scheme_prefix(raw)
    {
        return raw.to_string();
    }
    format!("https://{raw}")
}

/// `true` for `<scheme>://...` where scheme is `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
fn has_scheme_prefix(raw: &str) -> bool {
    let Some((scheme, _)) = raw.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Glyph shown in place of a favicon. Derived from the name only.
pub fn fallback_glyph(name: &str) -> String {
    match name.chars().next() {
        Some(first) => first.to_uppercase().collect(),
        None => "?".to_string(),
    }
}

/// Favicon image source for `url`, or `None` when no hostname can be parsed.
pub fn favicon_src(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str().filter(|h| !h.is_empty())?;
    Some(format!("{FAVICON_ENDPOINT}?domain={host}&sz=64"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_url_prefixes_bare_hosts() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("mail.com/inbox"), "https://mail.com/inbox");
        assert_eq!(
            normalize_url("example.com/?next=http://other"),
            "https://example.com/?next=http://other"
        );
        assert_eq!(normalize_url(""), "https://");
    }

    #[test]
    fn normalize_url_keeps_existing_schemes() {
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
        assert_eq!(normalize_url("ftp://example.com"), "ftp://example.com");
        assert_eq!(normalize_url("//example.com"), "//example.com");
    }

    #[test]
    fn normalize_url_is_case_sensitive_prefix_check() {
        // Only the exact lowercase prefixes count as http(s); an uppercase
        // scheme still looks like a scheme and is left alone.
        assert_eq!(normalize_url("HTTP://example.com"), "HTTP://example.com");
    }

    #[test]
    fn fallback_glyph_uses_first_char_or_question_mark() {
        assert_eq!(fallback_glyph("mail"), "M");
        assert_eq!(fallback_glyph("Ünter"), "Ü");
        assert_eq!(fallback_glyph("ß"), "SS");
        assert_eq!(fallback_glyph(""), "?");
    }

    #[test]
    fn favicon_src_uses_hostname() {
        assert_eq!(
            favicon_src("https://mail.example.com/inbox").as_deref(),
            Some("https://www.google.com/s2/favicons?domain=mail.example.com&sz=64")
        );
        assert_eq!(favicon_src("not a url"), None);
        assert_eq!(favicon_src("mailto:someone@example.com"), None);
    }

    #[test]
    fn records_default_missing_fields() {
        let record: BookmarkRecord = serde_json::from_str(r#"{"url":"https://x"}"#).unwrap_or_default();
        assert_eq!(record, BookmarkRecord::new("", "https://x"));
    }
}
