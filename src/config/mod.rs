//! Configuration loading.
//!
//! Precedence chain, lowest to highest: built-in defaults, TOML config
//! file, environment variables, CLI arguments. Each layer only overrides
//! what it actually sets.

use crate::source::PollIntervals;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors while loading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Raw config file contents. Every field optional; unset fields fall
/// through to the previous layer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Where the internal diagnostics log goes (the TUI owns the terminal).
    pub log_file_path: Option<PathBuf>,
    /// Tail poll interval while the file is quiet, milliseconds.
    pub idle_poll_ms: Option<u64>,
    /// Tail poll interval right after activity, milliseconds.
    pub active_poll_ms: Option<u64>,
    /// Disable colors.
    pub no_color: Option<bool>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub log_file_path: PathBuf,
    pub idle_poll_ms: u64,
    pub active_poll_ms: u64,
    pub no_color: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let state_dir = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(std::env::temp_dir);
        Self {
            log_file_path: state_dir.join("reqtail").join("reqtail.log"),
            idle_poll_ms: 500,
            active_poll_ms: 10,
            no_color: false,
        }
    }
}

impl ResolvedConfig {
    /// Tail-loop cadence from the configured intervals.
    pub fn poll_intervals(&self) -> PollIntervals {
        PollIntervals {
            idle: Duration::from_millis(self.idle_poll_ms),
            active: Duration::from_millis(self.active_poll_ms),
        }
    }
}

/// Load the config file: an explicit `--config` path must exist and parse;
/// otherwise the default location is used when present, and silently
/// skipped when absent.
pub fn load_config_file(explicit: Option<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path, true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(None),
        },
    };

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(source) if !required && source.kind() == std::io::ErrorKind::NotFound => {
            return Ok(None)
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    toml::from_str(&raw)
        .map(Some)
        .map_err(|source| ConfigError::Parse { path, source })
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reqtail").join("config.toml"))
}

/// Merge the config file over the defaults.
pub fn merge_config(file: Option<ConfigFile>) -> ResolvedConfig {
    let mut resolved = ResolvedConfig::default();
    let Some(file) = file else {
        return resolved;
    };
    if let Some(path) = file.log_file_path {
        resolved.log_file_path = path;
    }
    if let Some(ms) = file.idle_poll_ms {
        resolved.idle_poll_ms = ms;
    }
    if let Some(ms) = file.active_poll_ms {
        resolved.active_poll_ms = ms;
    }
    if let Some(no_color) = file.no_color {
        resolved.no_color = no_color;
    }
    resolved
}

/// Apply environment overrides (`REQTAIL_LOG_FILE`, `REQTAIL_IDLE_POLL_MS`,
/// `REQTAIL_ACTIVE_POLL_MS`, `NO_COLOR`).
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(path) = std::env::var("REQTAIL_LOG_FILE") {
        config.log_file_path = PathBuf::from(path);
    }
    if let Some(ms) = env_u64("REQTAIL_IDLE_POLL_MS") {
        config.idle_poll_ms = ms;
    }
    if let Some(ms) = env_u64("REQTAIL_ACTIVE_POLL_MS") {
        config.active_poll_ms = ms;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        config.no_color = true;
    }
    config
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok()?.parse().ok()
}

/// Apply CLI overrides. Flags only push in one direction; absent flags
/// leave the lower layers in charge.
pub fn apply_cli_overrides(mut config: ResolvedConfig, no_color: Option<bool>) -> ResolvedConfig {
    if let Some(no_color) = no_color {
        config.no_color = no_color;
    }
    config
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn defaults_have_duty_cycle_intervals() {
        let config = ResolvedConfig::default();
        assert_eq!(config.idle_poll_ms, 500);
        assert_eq!(config.active_poll_ms, 10);
        assert!(!config.no_color);
    }

    #[test]
    fn merge_without_file_keeps_defaults() {
        assert_eq!(merge_config(None), ResolvedConfig::default());
    }

    #[test]
    fn file_overrides_defaults() {
        let file: ConfigFile = toml::from_str(
            r#"
            idle_poll_ms = 1000
            no_color = true
            "#,
        )
        .expect("valid toml");
        let resolved = merge_config(Some(file));
        assert_eq!(resolved.idle_poll_ms, 1000);
        assert_eq!(resolved.active_poll_ms, 10, "unset fields keep defaults");
        assert!(resolved.no_color);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed = toml::from_str::<ConfigFile>("unknown_setting = 1");
        assert!(parsed.is_err());
    }

    #[test]
    fn cli_override_wins() {
        let resolved = apply_cli_overrides(ResolvedConfig::default(), Some(true));
        assert!(resolved.no_color);
        let untouched = apply_cli_overrides(ResolvedConfig::default(), None);
        assert!(!untouched.no_color);
    }

    #[test]
    #[serial(reqtail_env)]
    fn env_overrides_apply_between_file_and_cli() {
        std::env::set_var("REQTAIL_IDLE_POLL_MS", "250");
        let resolved = apply_env_overrides(ResolvedConfig::default());
        std::env::remove_var("REQTAIL_IDLE_POLL_MS");
        assert_eq!(resolved.idle_poll_ms, 250);
    }

    #[test]
    #[serial(reqtail_env)]
    fn unparsable_env_value_is_ignored() {
        std::env::set_var("REQTAIL_IDLE_POLL_MS", "soon");
        let resolved = apply_env_overrides(ResolvedConfig::default());
        std::env::remove_var("REQTAIL_IDLE_POLL_MS");
        assert_eq!(resolved.idle_poll_ms, 500);
    }

    #[test]
    fn poll_intervals_convert_to_durations() {
        let config = ResolvedConfig {
            idle_poll_ms: 200,
            active_poll_ms: 5,
            ..ResolvedConfig::default()
        };
        let intervals = config.poll_intervals();
        assert_eq!(intervals.idle, Duration::from_millis(200));
        assert_eq!(intervals.active, Duration::from_millis(5));
    }

    #[test]
    fn missing_default_config_is_not_an_error() {
        // The default path almost certainly does not exist in CI; either way
        // this must not fail when no explicit path was given.
        let result = load_config_file(None);
        assert!(result.is_ok());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let missing = std::env::temp_dir().join("reqtail_no_such_config_8321.toml");
        let result = load_config_file(Some(missing));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
