//! tabdash-cli: command-line front end for the tabdash dashboard.
//!
//! Each invocation plays one user interaction against the dashboard state:
//! the storage namespace is opened, the bookmark store is loaded, the
//! command runs, and every mutation is persisted before the process exits.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::OnceLock;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use tabdash_core::store::{BookmarkStore, LoadOutcome};
use tabdash_core::{FileStorage, KeyValueStorage, RecoveredNamespace};

use crate::config::Config;

pub mod add;
pub mod clear;
pub mod config;
pub mod edit;
pub mod list;
pub mod logging;
pub mod prefs;
pub mod remove;
pub mod transfer;

#[cfg(test)]
pub(crate) mod tests_common;

/// Stable crate label used by bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "tabdash-cli"
}

static VERSION: OnceLock<String> = OnceLock::new();

/// Set the version string for `--version` output.
pub fn set_version(version: &str) {
    let _ = VERSION.set(version.to_string());
}

fn get_version() -> &'static str {
    VERSION.get().map(|s| s.as_str()).unwrap_or("dev")
}

fn help_text() -> String {
    "\
tabdash keeps your new-tab dashboard: bookmarks, theme, clock and search.

Usage:
  tabdash [command]

Available Commands:
  add         Add a bookmark
  background  Show or set the background image and its blur and brightness
  clear-data  Delete all dashboard data
  edit        Edit a bookmark
  engine      Show or switch the search engine
  export      Export settings and bookmarks to a backup file
  help        Help about any command
  import      Import a backup file
  list        List bookmarks
  mute        Toggle sound effects
  name        Show or set the greeting name
  quote       Print a random quote
  rm          Delete a bookmark
  search      Print the search url for a query
  status      Show greeting, date and clock
  theme       Show or set the theme

Flags:
  -h, --help      help for tabdash
  -v, --version   version for tabdash

Positions are 1-based, as shown by \"tabdash list\".
Use \"tabdash [command] --help\" for more information about a command.\n"
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub(crate) fn ok(stdout: String) -> Self {
        Self {
            stdout,
            stderr: String::new(),
            exit_code: 0,
        }
    }

    /// Successful output with an optional warning on stderr.
    pub(crate) fn with_warning(stdout: String, warning: Option<String>) -> Self {
        Self {
            stdout,
            stderr: warning.unwrap_or_default(),
            exit_code: 0,
        }
    }

    pub(crate) fn failure(exit_code: i32, message: &str) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("{message}\n"),
            exit_code,
        }
    }

    /// Collapse a command result. `Err((0, help))` is a help request and goes
    /// to stdout; any other error code goes to stderr.
    pub(crate) fn from_result(result: Result<CommandOutput, (i32, String)>) -> Self {
        match result {
            Ok(out) => out,
            Err((0, message)) => Self::ok(message),
            Err((code, message)) => Self::failure(code, &message),
        }
    }
}

/// Storage handed to a command, plus a warning when it had to be recovered.
pub struct OpenedStorage {
    pub storage: Box<dyn KeyValueStorage>,
    pub warning: Option<String>,
}

impl OpenedStorage {
    /// Open the on-disk namespace, moving an unreadable file aside.
    pub fn open_file(path: &Path, quota: Option<usize>) -> Result<Self, String> {
        let (storage, recovered) =
            FileStorage::open_or_recover(path, quota).map_err(|e| e.to_string())?;
        Ok(Self {
            storage: Box::new(storage),
            warning: recovered.as_ref().map(recovery_warning),
        })
    }
}

fn recovery_warning(recovered: &RecoveredNamespace) -> String {
    format!(
        "warning: storage file was unreadable ({}); started empty, the old file is kept at {}\n",
        recovered.reason,
        recovered.preserved_as.display()
    )
}

/// Everything a command needs from the outside world.
pub trait DashBackend {
    fn open_storage(&self) -> Result<OpenedStorage, String>;
    /// Ask the user a yes/no question.
    fn confirm(&self, prompt: &str) -> bool;
    fn now_utc(&self) -> DateTime<Utc>;
    fn now_local(&self) -> NaiveDateTime;
    fn read_file(&self, path: &str) -> Result<String, String>;
    fn write_file(&self, path: &str, contents: &str) -> Result<(), String>;
}

/// Backend over the on-disk namespace described by [`Config`].
pub struct FilesystemDashBackend {
    config: Config,
}

impl FilesystemDashBackend {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl DashBackend for FilesystemDashBackend {
    fn open_storage(&self) -> Result<OpenedStorage, String> {
        OpenedStorage::open_file(&self.config.storage_path(), self.config.quota())
    }

    fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{prompt} [y/N] ");
        let _ = stderr.flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn read_file(&self, path: &str) -> Result<String, String> {
        std::fs::read_to_string(path).map_err(|e| format!("read {path}: {e}"))
    }

    fn write_file(&self, path: &str, contents: &str) -> Result<(), String> {
        std::fs::write(path, contents).map_err(|e| format!("write {path}: {e}"))
    }
}

pub(crate) type CliStore = BookmarkStore<Box<dyn KeyValueStorage>>;

/// Open storage and load the bookmark list.
///
/// Neither an unreadable storage file nor a malformed saved list is fatal;
/// the returned warning explains where the raw data was preserved.
pub(crate) fn open_store(
    backend: &dyn DashBackend,
) -> Result<(CliStore, Option<String>), (i32, String)> {
    let opened = backend.open_storage().map_err(|e| (1, e))?;
    let (store, outcome) =
        BookmarkStore::open(opened.storage).map_err(|e| (1, e.to_string()))?;
    let list_warning = match outcome {
        LoadOutcome::Discarded {
            preserved_as: Some(key),
            ..
        } => Some(format!(
            "warning: saved bookmarks were malformed and have been reset; the original data is kept under \"{key}\"\n"
        )),
        LoadOutcome::Discarded {
            preserved_as: None, ..
        } => Some("warning: saved bookmarks were malformed and have been reset\n".to_string()),
        LoadOutcome::Empty | LoadOutcome::Loaded(_) => None,
    };
    let warning = match (opened.warning, list_warning) {
        (Some(mut first), Some(second)) => {
            first.push_str(&second);
            Some(first)
        }
        (first, second) => first.or(second),
    };
    Ok((store, warning))
}

/// Parse a 1-based position argument into a 0-based index.
pub(crate) fn parse_position(raw: &str) -> Result<usize, (i32, String)> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err((2, format!("invalid position: {raw} (positions start at 1)"))),
    }
}

pub fn run_cli_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    let Some((cmd, rest)) = args.split_first() else {
        return CommandOutput::ok(help_text());
    };

    let out = match *cmd {
        "--help" | "-h" | "help" => CommandOutput::ok(help_text()),
        "--version" | "-v" => CommandOutput::ok(format!("tabdash version {}\n", get_version())),
        "add" => add::run_add_for_test(rest, backend),
        "background" | "bg" => prefs::run_background_for_test(rest, backend),
        "clear-data" => clear::run_clear_for_test(rest, backend),
        "edit" => edit::run_edit_for_test(rest, backend),
        "engine" => prefs::run_engine_for_test(rest, backend),
        "export" => transfer::run_export_for_test(rest, backend),
        "import" => transfer::run_import_for_test(rest, backend),
        "list" | "ls" => list::run_list_for_test(rest, backend),
        "mute" => prefs::run_mute_for_test(rest, backend),
        "name" => prefs::run_name_for_test(rest, backend),
        "quote" => prefs::run_quote_for_test(rest, backend),
        "rm" | "delete" => remove::run_remove_for_test(rest, backend),
        "search" => prefs::run_search_for_test(rest, backend),
        "status" => prefs::run_status_for_test(rest, backend),
        "theme" => prefs::run_theme_for_test(rest, backend),
        _ => CommandOutput::failure(
            1,
            &format!("Error: unknown command \"{cmd}\" for \"tabdash\""),
        ),
    };
    tracing::debug!(command = *cmd, exit_code = out.exit_code, "command finished");
    out
}

pub fn run_cli(args: &[String], backend: &dyn DashBackend) -> CommandOutput {
    let refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    run_cli_for_test(&refs, backend)
}
