//! Logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "kinfile=info";

/// Filter directive used with `--verbose`.
pub const VERBOSE_FILTER: &str = "kinfile=debug";

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses a format name, case-insensitively. Unknown names yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Line format.
    pub format: LogFormat,
    /// `EnvFilter` directive, used when `RUST_LOG` is unset.
    pub filter: String,
    /// Log file; when unset, logs go to stderr.
    pub file: Option<PathBuf>,
    /// Clear the log file before the first line is written.
    pub truncate_on_start: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: DEFAULT_FILTER.to_string(),
            file: None,
            truncate_on_start: false,
        }
    }
}

impl LoggingConfig {
    /// Builds the configuration from file settings.
    ///
    /// `verbose` overrides any configured filter.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        let mut config = Self::default();
        if let Some(settings) = settings {
            if let Some(format) = settings.format.as_deref().and_then(LogFormat::parse) {
                config.format = format;
            }
            if let Some(filter) = settings.filter.as_ref().filter(|f| !f.trim().is_empty()) {
                config.filter.clone_from(filter);
            }
            config.file.clone_from(&settings.file);
            if let Some(truncate) = settings.truncate_on_start {
                config.truncate_on_start = truncate;
            }
        }
        if verbose {
            config.filter = VERBOSE_FILTER.to_string();
        }
        config
    }

    /// Sets the log file.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}
