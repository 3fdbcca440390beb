//! Dashboard preferences kept in the shared storage namespace.
//!
//! These are the sibling widgets' keys: theme, clock, greeting name, mute,
//! background image and search engine. The bookmark store never reads or
//! writes them.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use crate::error::StorageError;
use crate::storage::KeyValueStorage;

pub const THEME_KEY: &str = "savedTheme";
pub const CUSTOM_ACCENT_KEY: &str = "customAccentColor";
pub const CLOCK_24HR_KEY: &str = "clock24hr";
pub const CLOCK_SECONDS_KEY: &str = "clockSeconds";
pub const MUTED_KEY: &str = "isMuted";
pub const USERNAME_KEY: &str = "username";
pub const SEARCH_ENGINE_KEY: &str = "searchEngineIndex";
pub const BG_IMAGE_KEY: &str = "customBg";
pub const BG_BLUR_KEY: &str = "bgBlur";
pub const BG_BRIGHTNESS_KEY: &str = "bgBrightness";

pub const DEFAULT_THEME: &str = "slate";
pub const CUSTOM_THEME: &str = "custom";
pub const DEFAULT_ACCENT: &str = "#3b82f6";
pub const DEFAULT_DISPLAY_NAME: &str = "Guest";
pub const DEFAULT_BG_BLUR: u32 = 5;
pub const DEFAULT_BG_BRIGHTNESS: u32 = 100;
/// Slider maximums; larger values are clamped.
pub const MAX_BG_BLUR: u32 = 20;
pub const MAX_BG_BRIGHTNESS: u32 = 200;

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Theme currently applied, with the accent color when it is `custom`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeState {
    pub name: String,
    pub accent: Option<String>,
}

pub fn theme(storage: &dyn KeyValueStorage) -> Result<ThemeState, StorageError> {
    let name = storage
        .get_item(THEME_KEY)?
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_THEME.to_string());
    let accent = if name == CUSTOM_THEME {
        storage.get_item(CUSTOM_ACCENT_KEY)?
    } else {
        None
    };
    Ok(ThemeState { name, accent })
}

pub fn apply_theme(
    storage: &mut dyn KeyValueStorage,
    name: &str,
) -> Result<ThemeState, StorageError> {
    storage.set_item(THEME_KEY, name.trim())?;
    theme(storage)
}

pub fn custom_accent(storage: &dyn KeyValueStorage) -> Result<String, StorageError> {
    Ok(storage
        .get_item(CUSTOM_ACCENT_KEY)?
        .unwrap_or_else(|| DEFAULT_ACCENT.to_string()))
}

/// Save an accent color and switch to the custom theme.
pub fn set_custom_accent(
    storage: &mut dyn KeyValueStorage,
    color: &str,
) -> Result<ThemeState, StorageError> {
    storage.set_item(CUSTOM_ACCENT_KEY, color.trim())?;
    apply_theme(storage, CUSTOM_THEME)
}

// ---------------------------------------------------------------------------
// Clock & greeting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockPrefs {
    pub use_24h: bool,
    pub show_seconds: bool,
}

impl Default for ClockPrefs {
    fn default() -> Self {
        Self {
            use_24h: false,
            show_seconds: true,
        }
    }
}

pub fn clock_prefs(storage: &dyn KeyValueStorage) -> Result<ClockPrefs, StorageError> {
    Ok(ClockPrefs {
        use_24h: storage.get_item(CLOCK_24HR_KEY)?.as_deref() == Some("true"),
        show_seconds: storage.get_item(CLOCK_SECONDS_KEY)?.as_deref() != Some("false"),
    })
}

pub fn set_clock_prefs(
    storage: &mut dyn KeyValueStorage,
    prefs: ClockPrefs,
) -> Result<(), StorageError> {
    storage.set_item(CLOCK_24HR_KEY, bool_str(prefs.use_24h))?;
    storage.set_item(CLOCK_SECONDS_KEY, bool_str(prefs.show_seconds))
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// `HH:MM[:SS]`, with a ` AM`/` PM` suffix in 12 hour mode.
pub fn format_clock(time: NaiveTime, prefs: ClockPrefs) -> String {
    let (hours, suffix) = if prefs.use_24h {
        (time.hour(), "")
    } else {
        let (is_pm, hour12) = time.hour12();
        (hour12, if is_pm { " PM" } else { " AM" })
    };
    if prefs.show_seconds {
        format!(
            "{hours:02}:{:02}:{:02}{suffix}",
            time.minute(),
            time.second()
        )
    } else {
        format!("{hours:02}:{:02}{suffix}", time.minute())
    }
}

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

/// Long date, e.g. `Monday, January 5, 2026`.
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{}, {} {}, {}",
        date.format("%A"),
        date.format("%B"),
        date.day(),
        date.year()
    )
}

pub fn display_name(storage: &dyn KeyValueStorage) -> Result<String, StorageError> {
    Ok(storage
        .get_item(USERNAME_KEY)?
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()))
}

/// Save a trimmed display name. Blank input is ignored; returns whether it was saved.
pub fn set_display_name(
    storage: &mut dyn KeyValueStorage,
    name: &str,
) -> Result<bool, StorageError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Ok(false);
    }
    storage.set_item(USERNAME_KEY, trimmed)?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Mute
// ---------------------------------------------------------------------------

pub fn is_muted(storage: &dyn KeyValueStorage) -> Result<bool, StorageError> {
    Ok(storage.get_item(MUTED_KEY)?.as_deref() == Some("true"))
}

/// Flip the mute flag and return the new value.
pub fn toggle_mute(storage: &mut dyn KeyValueStorage) -> Result<bool, StorageError> {
    let muted = !is_muted(storage)?;
    storage.set_item(MUTED_KEY, bool_str(muted))?;
    Ok(muted)
}

// ---------------------------------------------------------------------------
// Background
// ---------------------------------------------------------------------------

/// Custom background image and the filter applied over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundPrefs {
    pub image: Option<String>,
    /// Blur radius in pixels.
    pub blur: u32,
    /// Brightness in percent.
    pub brightness: u32,
}

impl Default for BackgroundPrefs {
    fn default() -> Self {
        Self {
            image: None,
            blur: DEFAULT_BG_BLUR,
            brightness: DEFAULT_BG_BRIGHTNESS,
        }
    }
}

impl BackgroundPrefs {
    /// CSS `filter` value for the background overlay.
    pub fn css_filter(&self) -> String {
        format!("blur({}px) brightness({}%)", self.blur, self.brightness)
    }
}

fn stored_number(
    storage: &dyn KeyValueStorage,
    key: &str,
    default: u32,
) -> Result<u32, StorageError> {
    Ok(storage
        .get_item(key)?
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .unwrap_or(default))
}

pub fn background(storage: &dyn KeyValueStorage) -> Result<BackgroundPrefs, StorageError> {
    Ok(BackgroundPrefs {
        image: storage
            .get_item(BG_IMAGE_KEY)?
            .filter(|url| !url.trim().is_empty()),
        blur: stored_number(storage, BG_BLUR_KEY, DEFAULT_BG_BLUR)?,
        brightness: stored_number(storage, BG_BRIGHTNESS_KEY, DEFAULT_BG_BRIGHTNESS)?,
    })
}

/// Use the image at `url` as background. Blank input is ignored; returns whether it was saved.
pub fn set_background_url(
    storage: &mut dyn KeyValueStorage,
    url: &str,
) -> Result<bool, StorageError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Ok(false);
    }
    storage.set_item(BG_IMAGE_KEY, trimmed)?;
    Ok(true)
}

/// Save the blur radius, clamped to [`MAX_BG_BLUR`]. Returns the saved value.
pub fn set_background_blur(
    storage: &mut dyn KeyValueStorage,
    px: u32,
) -> Result<u32, StorageError> {
    let px = px.min(MAX_BG_BLUR);
    storage.set_item(BG_BLUR_KEY, &px.to_string())?;
    Ok(px)
}

/// Save the brightness, clamped to [`MAX_BG_BRIGHTNESS`]. Returns the saved value.
pub fn set_background_brightness(
    storage: &mut dyn KeyValueStorage,
    percent: u32,
) -> Result<u32, StorageError> {
    let percent = percent.min(MAX_BG_BRIGHTNESS);
    storage.set_item(BG_BRIGHTNESS_KEY, &percent.to_string())?;
    Ok(percent)
}

/// Drop the image and both filter values.
pub fn reset_background(storage: &mut dyn KeyValueStorage) -> Result<(), StorageError> {
    storage.remove_item(BG_IMAGE_KEY)?;
    storage.remove_item(BG_BLUR_KEY)?;
    storage.remove_item(BG_BRIGHTNESS_KEY)
}

// ---------------------------------------------------------------------------
// Search engines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchEngine {
    pub name: &'static str,
    pub icon: &'static str,
    pub query_url: &'static str,
}

pub const SEARCH_ENGINES: [SearchEngine; 4] = [
    SearchEngine {
        name: "Google",
        icon: "https://www.google.com/favicon.ico",
        query_url: "https://www.google.com/search?q=",
    },
    SearchEngine {
        name: "DuckDuckGo",
        icon: "https://duckduckgo.com/favicon.ico",
        query_url: "https://duckduckgo.com/?q=",
    },
    SearchEngine {
        name: "Bing",
        icon: "https://www.bing.com/favicon.ico",
        query_url: "https://www.bing.com/search?q=",
    },
    SearchEngine {
        name: "Brave",
        icon: "https://brave.com/static-assets/images/brave-favicon.png",
        query_url: "https://search.brave.com/search?q=",
    },
];

/// Stored engine index; anything unparseable or out of range selects the first engine.
pub fn current_engine_index(storage: &dyn KeyValueStorage) -> Result<usize, StorageError> {
    let index = storage
        .get_item(SEARCH_ENGINE_KEY)?
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|i| *i < SEARCH_ENGINES.len())
        .unwrap_or(0);
    Ok(index)
}

pub fn current_engine(storage: &dyn KeyValueStorage) -> Result<SearchEngine, StorageError> {
    Ok(SEARCH_ENGINES[current_engine_index(storage)?])
}

/// Advance to the next engine, wrapping around.
pub fn cycle_engine(storage: &mut dyn KeyValueStorage) -> Result<SearchEngine, StorageError> {
    let next = (current_engine_index(storage)? + 1) % SEARCH_ENGINES.len();
    storage.set_item(SEARCH_ENGINE_KEY, &next.to_string())?;
    Ok(SEARCH_ENGINES[next])
}

/// Search url for a trimmed query; `None` for a blank query.
///
/// Spaces are sent as `%20`, not the form-encoding `+`.
pub fn search_url(engine: &SearchEngine, query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes())
        .map(|chunk| if chunk == "+" { "%20" } else { chunk })
        .collect();
    Some(format!("{}{encoded}", engine.query_url))
}
