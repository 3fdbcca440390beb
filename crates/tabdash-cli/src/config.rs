//! CLI configuration.
//!
//! Precedence: defaults < config file < environment. The config file is
//! `$TABDASH_CONFIG` when set (a hard error if unreadable), otherwise the
//! optional `$XDG_CONFIG_HOME/tabdash/config.yaml` or
//! `~/.config/tabdash/config.yaml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tabdash_core::storage::DEFAULT_QUOTA_BYTES;

pub const ENV_CONFIG: &str = "TABDASH_CONFIG";
pub const ENV_DATA_DIR: &str = "TABDASH_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "TABDASH_LOG_LEVEL";

/// File name of the storage namespace inside the data dir.
pub const STORAGE_FILE_NAME: &str = "storage.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub global: GlobalConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Namespace quota in bytes; `0` disables the quota.
    pub quota_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    pub fn default_from_env() -> Self {
        let home = std::env::var("HOME").unwrap_or_default();
        let data_dir = if home.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&home)
                .join(".local")
                .join("share")
                .join("tabdash")
        };
        Self {
            global: GlobalConfig { data_dir },
            storage: StorageConfig {
                quota_bytes: DEFAULT_QUOTA_BYTES,
            },
            logging: LoggingConfig {
                level: "warn".to_string(),
                format: "console".to_string(),
            },
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.global.data_dir.join(STORAGE_FILE_NAME)
    }

    pub fn quota(&self) -> Option<usize> {
        if self.storage.quota_bytes == 0 {
            None
        } else {
            Some(self.storage.quota_bytes)
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.global.data_dir.as_os_str().is_empty() {
            return Err("global.data_dir is required".into());
        }
        match self.logging.level.to_lowercase().trim() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(
                    "logging.level must be one of trace, debug, info, warn, error".into(),
                )
            }
        }
        match self.logging.format.to_lowercase().trim() {
            "console" | "json" => {}
            _ => return Err("logging.format must be one of console, json".into()),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    #[serde(default)]
    global: PartialGlobalConfig,
    #[serde(default)]
    storage: PartialStorageConfig,
    #[serde(default)]
    logging: PartialLoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
struct PartialGlobalConfig {
    #[serde(default)]
    data_dir: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartialStorageConfig {
    #[serde(default)]
    quota_bytes: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialLoggingConfig {
    #[serde(default)]
    level: String,
    #[serde(default)]
    format: String,
}

/// Load config with the documented precedence. Returns the file used, if any.
pub fn load_config(config_file: Option<&str>) -> Result<(Config, Option<PathBuf>), String> {
    let mut cfg = Config::default_from_env();

    let explicit = config_file
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    let (path_to_try, required) = match explicit {
        Some(path) => (Some(path), true),
        None => (default_config_path(), false),
    };

    let mut used = None;
    if let Some(path) = path_to_try {
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let parsed = parse_partial(&text)?;
                apply_partial(&mut cfg, parsed)?;
                used = Some(path);
            }
            Err(err) => {
                if required {
                    return Err(format!("failed to load config file: {err}"));
                }
            }
        }
    }

    apply_env(&mut cfg, |key| std::env::var(key).ok())?;
    cfg.validate()?;
    Ok((cfg, used))
}

fn parse_partial(text: &str) -> Result<PartialConfig, String> {
    if text.trim().is_empty() {
        return Ok(PartialConfig::default());
    }
    serde_yaml::from_str(text).map_err(|err| format!("parse config: {err}"))
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Some(PathBuf::from(xdg).join("tabdash").join("config.yaml"));
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(
                PathBuf::from(home)
                    .join(".config")
                    .join("tabdash")
                    .join("config.yaml"),
            );
        }
    }
    None
}

fn apply_partial(cfg: &mut Config, partial: PartialConfig) -> Result<(), String> {
    if !partial.global.data_dir.trim().is_empty() {
        cfg.global.data_dir = expand_tilde(partial.global.data_dir.trim())?;
    }
    if let Some(quota) = partial.storage.quota_bytes {
        if quota < 0 {
            return Err("storage.quota_bytes must be zero or greater".into());
        }
        cfg.storage.quota_bytes = usize::try_from(quota)
            .map_err(|_| format!("storage.quota_bytes {quota} is too large for this platform"))?;
    }
    if !partial.logging.level.trim().is_empty() {
        cfg.logging.level = partial.logging.level.trim().to_string();
    }
    if !partial.logging.format.trim().is_empty() {
        cfg.logging.format = partial.logging.format.trim().to_string();
    }
    Ok(())
}

fn apply_env(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) -> Result<(), String> {
    if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
        cfg.global.data_dir = expand_tilde(dir.trim())?;
    }
    if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
        cfg.logging.level = level.trim().to_string();
    }
    Ok(())
}

fn expand_tilde(input: &str) -> Result<PathBuf, String> {
    if input == "~" {
        let home = std::env::var("HOME").map_err(|_| "failed to resolve HOME".to_string())?;
        return Ok(PathBuf::from(home));
    }
    if let Some(rest) = input.strip_prefix("~/") {
        let home = std::env::var("HOME").map_err(|_| "failed to resolve HOME".to_string())?;
        return Ok(PathBuf::from(home).join(rest));
    }
    Ok(Path::new(input).to_path_buf())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default_from_env();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.quota(), Some(DEFAULT_QUOTA_BYTES));
        assert!(cfg.storage_path().ends_with("storage.json"));
    }

    #[test]
    fn partial_file_overrides_defaults() {
        let mut cfg = Config::default_from_env();
        let partial = parse_partial(
            "global:\n  data_dir: /tmp/tabdash-data\nstorage:\n  quota_bytes: 0\nlogging:\n  level: debug\n  format: json\n",
        )
        .expect("parse");
        apply_partial(&mut cfg, partial).expect("apply");
        assert_eq!(cfg.global.data_dir, PathBuf::from("/tmp/tabdash-data"));
        assert_eq!(cfg.quota(), None);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.format, "json");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::default_from_env();
        apply_env(&mut cfg, |key| match key {
            ENV_DATA_DIR => Some("/srv/dash".to_string()),
            ENV_LOG_LEVEL => Some(" info ".to_string()),
            _ => None,
        })
        .expect("apply env");
        assert_eq!(cfg.global.data_dir, PathBuf::from("/srv/dash"));
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn negative_quota_is_rejected() {
        let mut cfg = Config::default_from_env();
        let partial = parse_partial("storage:\n  quota_bytes: -1\n").expect("parse");
        assert_eq!(
            apply_partial(&mut cfg, partial),
            Err("storage.quota_bytes must be zero or greater".to_string())
        );
    }

    #[test]
    fn large_quota_is_converted_without_truncation() {
        let mut cfg = Config::default_from_env();
        let partial = parse_partial("storage:\n  quota_bytes: 4294967295\n").expect("parse");
        let applied = apply_partial(&mut cfg, partial);
        match usize::try_from(4_294_967_295_i64) {
            Ok(expected) => {
                assert_eq!(applied, Ok(()));
                assert_eq!(cfg.storage.quota_bytes, expected);
            }
            Err(_) => assert!(applied.unwrap_err().contains("too large")),
        }
    }

    #[test]
    fn bad_log_format_fails_validation() {
        let mut cfg = Config::default_from_env();
        cfg.logging.format = "xml".into();
        assert_eq!(
            cfg.validate(),
            Err("logging.format must be one of console, json".to_string())
        );
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.yaml");
        let err = load_config(Some(missing.to_str().unwrap())).unwrap_err();
        assert!(err.starts_with("failed to load config file"));
    }

    #[test]
    fn explicit_file_is_reported_as_used() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "logging:\n  format: json\n").unwrap();
        let (cfg, used) = load_config(Some(path.to_str().unwrap())).expect("load");
        assert_eq!(used.as_deref(), Some(path.as_path()));
        assert_eq!(cfg.logging.format, "json");
    }
}
