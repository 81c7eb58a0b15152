//! Configuration management.

pub mod mode;

pub use mode::{ModeCondition, ModeReading, ModeSnapshot, ModeStore, ScopeMode, render_mode_file};

use crate::observability::LoggingConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Directory name under the platform data dir.
pub const APP_DIR_NAME: &str = "kinfile";

/// Records directory name under the data dir.
pub const RECORDS_DIR_NAME: &str = "Birthdays";

/// Mode file name under the data dir.
pub const MODE_FILE_NAME: &str = "config.ini";

/// Log file name under the data dir.
pub const LOG_FILE_NAME: &str = "kinfile_log.txt";

/// Main configuration for kinfile.
#[derive(Debug, Clone, PartialEq)]
pub struct KinfileConfig {
    /// Root of everything kinfile writes.
    pub data_dir: PathBuf,
    /// Where character records live.
    pub records_dir: PathBuf,
    /// The single/family mode file.
    pub mode_file: PathBuf,
    /// Logging settings as read from the config file.
    pub logging: LoggingSettings,
}

/// Logging section in config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// `EnvFilter` directive.
    pub filter: Option<String>,
    /// Log file path.
    pub file: Option<PathBuf>,
    /// Clear the log file on start.
    pub truncate_on_start: Option<bool>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Records directory.
    pub records_dir: Option<String>,
    /// Mode file.
    pub mode_file: Option<String>,
    /// Logging configuration.
    pub logging: Option<LoggingSettings>,
}

impl Default for KinfileConfig {
    fn default() -> Self {
        let data_dir = directories::BaseDirs::new().map_or_else(
            || PathBuf::from(".kinfile"),
            |dirs| dirs.data_dir().join(APP_DIR_NAME),
        );
        Self::with_root(data_dir)
    }
}

impl KinfileConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with every path under `data_dir`.
    #[must_use]
    pub fn with_root(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            records_dir: data_dir.join(RECORDS_DIR_NAME),
            mode_file: data_dir.join(MODE_FILE_NAME),
            data_dir,
            logging: LoggingSettings::default(),
        }
    }

    /// Moves the data dir. Records dir and mode file follow unless they were
    /// set somewhere else explicitly.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        if self.records_dir == self.data_dir.join(RECORDS_DIR_NAME) {
            self.records_dir = data_dir.join(RECORDS_DIR_NAME);
        }
        if self.mode_file == self.data_dir.join(MODE_FILE_NAME) {
            self.mode_file = data_dir.join(MODE_FILE_NAME);
        }
        self.data_dir = data_dir;
        self
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: e.to_string(),
            })?;

        let file: ConfigFile =
            toml::from_str(&contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/kinfile/` on macOS)
    /// 2. XDG config dir (`~/.config/kinfile/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let platform_config = base_dirs
            .config_dir()
            .join(APP_DIR_NAME)
            .join("config.toml");
        if platform_config.exists() {
            if let Ok(config) = Self::load_from_file(&platform_config) {
                return config;
            }
        }

        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join(APP_DIR_NAME)
            .join("config.toml");
        if xdg_config.exists() {
            if let Ok(config) = Self::load_from_file(&xdg_config) {
                return config;
            }
        }

        Self::default()
    }

    /// Resolved logging configuration. The log file defaults to
    /// `<data dir>/kinfile_log.txt`.
    #[must_use]
    pub fn logging_config(&self, verbose: bool) -> LoggingConfig {
        let mut logging = LoggingConfig::from_settings(Some(&self.logging), verbose);
        if logging.file.is_none() {
            logging.file = Some(self.data_dir.join(LOG_FILE_NAME));
        }
        logging
    }

    /// Converts a `ConfigFile` to `KinfileConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config = config.with_data_dir(data_dir);
        }
        if let Some(records_dir) = file.records_dir {
            config.records_dir = PathBuf::from(records_dir);
        }
        if let Some(mode_file) = file.mode_file {
            config.mode_file = PathBuf::from(mode_file);
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_with_root_layout() {
        let config = KinfileConfig::with_root("/data/kinfile");
        assert_eq!(config.records_dir, PathBuf::from("/data/kinfile/Birthdays"));
        assert_eq!(config.mode_file, PathBuf::from("/data/kinfile/config.ini"));
    }

    #[test]
    fn test_with_data_dir_moves_default_paths() {
        let config = KinfileConfig::with_root("/a").with_data_dir("/b");
        assert_eq!(config.records_dir, PathBuf::from("/b/Birthdays"));
        assert_eq!(config.mode_file, PathBuf::from("/b/config.ini"));

        let mut custom = KinfileConfig::with_root("/a");
        custom.records_dir = PathBuf::from("/elsewhere");
        let moved = custom.with_data_dir("/b");
        assert_eq!(moved.records_dir, PathBuf::from("/elsewhere"));
        assert_eq!(moved.mode_file, PathBuf::from("/b/config.ini"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
data_dir = "/srv/kinfile"
mode_file = "/etc/kinfile/mode.ini"

[logging]
format = "json"
truncate_on_start = true
"#,
        )
        .unwrap();

        let config = KinfileConfig::load_from_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/kinfile"));
        assert_eq!(config.records_dir, PathBuf::from("/srv/kinfile/Birthdays"));
        assert_eq!(config.mode_file, PathBuf::from("/etc/kinfile/mode.ini"));
        assert_eq!(config.logging.format.as_deref(), Some("json"));

        let logging = config.logging_config(false);
        assert_eq!(logging.file, Some(PathBuf::from("/srv/kinfile/kinfile_log.txt")));
        assert!(logging.truncate_on_start);
    }

    #[test]
    fn test_load_from_file_errors() {
        let dir = TempDir::new().unwrap();
        assert!(KinfileConfig::load_from_file(&dir.path().join("missing.toml")).is_err());

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "data_dir = [").unwrap();
        assert!(KinfileConfig::load_from_file(&path).is_err());
    }
}
