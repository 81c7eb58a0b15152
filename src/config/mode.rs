//! Single/family scope selector and its file.
//!
//! The mode file is a tiny record in the same `key=value` format as the
//! character records:
//!
//! ```text
//! //Lines started with // are comments.
//!
//! //Mode: (Available options: Single, Family)
//! Mode=Family
//! ```
//!
//! It is reloaded before every action, so edits take effect on the next
//! export, import or toggle.

use super::KinfileConfig;
use crate::codec;
use crate::observability::{Announcer, NoticeSink};
use crate::{Error, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key of the mode entry.
pub const MODE_KEY: &str = "Mode";

/// Mode written when the file does not exist.
pub const DEFAULT_MODE: ScopeMode = ScopeMode::Family;

/// Which characters an action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeMode {
    /// Unreadable mode; gated actions do nothing.
    None,
    /// Only the current character.
    Single,
    /// The current character's family closure.
    Family,
}

impl ScopeMode {
    /// Modes that can be written to the mode file.
    #[must_use]
    pub const fn selectable() -> &'static [Self] {
        &[Self::Single, Self::Family]
    }

    /// Label used in the mode file. `None` has no label.
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Single => Some("Single"),
            Self::Family => Some("Family"),
        }
    }

    /// Maps a raw value to a mode. Case-sensitive.
    ///
    /// Blank input is `Missing`; anything other than `Single` or `Family` is
    /// `Invalid`.
    #[must_use]
    pub fn read(raw: &str) -> ModeReading {
        let raw = raw.trim();
        if raw.is_empty() {
            return ModeReading::rejected(ModeCondition::Missing);
        }
        Self::selectable()
            .iter()
            .copied()
            .find(|mode| mode.label() == Some(raw))
            .map_or_else(
                || ModeReading::rejected(ModeCondition::Invalid(raw.to_string())),
                ModeReading::valid,
            )
    }

    /// `Single` and `Family` swap; `None` stays `None`.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Single => Self::Family,
            Self::Family => Self::Single,
        }
    }
}

impl fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().unwrap_or("None"))
    }
}

/// Why a mode value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeCondition {
    /// No value at all.
    Missing,
    /// A value that is not a mode label.
    Invalid(String),
}

/// Result of reading a mode value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeReading {
    /// The resolved mode.
    pub mode: ScopeMode,
    /// Set when the mode resolved to `None`.
    pub condition: Option<ModeCondition>,
}

impl ModeReading {
    const fn valid(mode: ScopeMode) -> Self {
        Self {
            mode,
            condition: None,
        }
    }

    const fn rejected(condition: ModeCondition) -> Self {
        Self {
            mode: ScopeMode::None,
            condition: Some(condition),
        }
    }
}

/// Renders the mode file.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for [`ScopeMode::None`], which is never
/// persisted.
pub fn render_mode_file(mode: ScopeMode) -> Result<String> {
    let label = mode
        .label()
        .ok_or_else(|| Error::InvalidInput("mode None cannot be saved".to_string()))?;
    let options: Vec<&str> = ScopeMode::selectable()
        .iter()
        .filter_map(|m| m.label())
        .collect();
    Ok(format!(
        "{marker}Lines started with {marker} are comments.\n\n{marker}Mode: (Available options: {})\n{MODE_KEY}={label}\n",
        options.join(", "),
        marker = codec::COMMENT_MARKER,
    ))
}

/// Mode as loaded for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSnapshot {
    /// The parsed mode.
    pub reading: ModeReading,
    /// The value as written in the file, empty if absent.
    pub raw: String,
    /// The file it was read from.
    pub path: PathBuf,
}

impl ModeSnapshot {
    /// The resolved mode.
    #[must_use]
    pub const fn mode(&self) -> ScopeMode {
        self.reading.mode
    }
}

/// File-backed mode persistence.
#[derive(Debug, Clone)]
pub struct ModeStore {
    path: PathBuf,
    dirs: Vec<PathBuf>,
}

impl ModeStore {
    /// Store for a mode file; only its parent directory is created.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let dirs = path.parent().map(Path::to_path_buf).into_iter().collect();
        Self { path, dirs }
    }

    /// Store for the configured mode file that also creates the data and
    /// records directories on load.
    #[must_use]
    pub fn from_config(config: &KinfileConfig) -> Self {
        let mut store = Self::new(&config.mode_file);
        store.dirs.push(config.data_dir.clone());
        store.dirs.push(config.records_dir.clone());
        store
    }

    /// Path of the mode file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads a fresh snapshot.
    ///
    /// Creates missing directories and writes [`DEFAULT_MODE`] if the file
    /// does not exist. A missing `Mode` entry is announced; an invalid value
    /// is only logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories or the file cannot be created or
    /// read.
    pub fn load<S: NoticeSink>(&self, announcer: &mut Announcer<S>) -> Result<ModeSnapshot> {
        for dir in &self.dirs {
            fs::create_dir_all(dir).map_err(|e| Error::OperationFailed {
                operation: "create_data_dir".to_string(),
                cause: format!("{}: {e}", dir.display()),
            })?;
        }
        if !self.path.exists() {
            debug!(path = %self.path.display(), "writing default mode file");
            self.save(DEFAULT_MODE)?;
        }

        let text = fs::read_to_string(&self.path).map_err(|e| Error::OperationFailed {
            operation: "read_mode_file".to_string(),
            cause: e.to_string(),
        })?;
        let raw = codec::decode(&text)
            .get(MODE_KEY)
            .unwrap_or_default()
            .to_string();
        let reading = ScopeMode::read(&raw);

        match &reading.condition {
            Some(ModeCondition::Missing) => announcer.warn(format!(
                "\"{MODE_KEY}\" entry not found. Please check {}, or delete it to restore the default.",
                self.path.display()
            )),
            Some(ModeCondition::Invalid(value)) => warn!(value = %value, "invalid mode"),
            None => debug!(mode = %reading.mode, "loaded mode"),
        }

        Ok(ModeSnapshot {
            reading,
            raw,
            path: self.path.clone(),
        })
    }

    /// Overwrites the mode file.
    ///
    /// # Errors
    ///
    /// Returns an error for [`ScopeMode::None`] or if the file cannot be
    /// written.
    pub fn save(&self, mode: ScopeMode) -> Result<()> {
        let text = render_mode_file(mode)?;
        fs::write(&self.path, text).map_err(|e| Error::OperationFailed {
            operation: "write_mode_file".to_string(),
            cause: e.to_string(),
        })
    }
}
