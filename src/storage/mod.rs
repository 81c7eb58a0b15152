//! Record storage.
//!
//! One text record per character, addressed by a [`RecordKey`]:
//! - **Filesystem**: `<records dir>/<name>.<id>.txt`, the default
//! - **Memory**: a map, for tests

mod filesystem;
mod memory;

pub use filesystem::{FilesystemRecordStore, MAX_RECORD_SIZE};
pub use memory::InMemoryRecordStore;

use crate::Result;
use crate::models::EntityId;
use std::fmt::{self, Write as _};

/// Escape marker in the id part of a key. A lone marker is the empty id.
const ID_ESCAPE: char = '-';

/// Address of one character's record.
///
/// Built from the display name, which keeps files easy to find, and the
/// entity id, which keeps two characters with the same name apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey(String);

impl RecordKey {
    /// Key for a character, `<sanitized name>.<escaped id>`.
    ///
    /// In the name, characters other than alphanumerics, `-` and `_` are
    /// replaced with `_`. The id is escaped reversibly: every other byte,
    /// `-` included, becomes `-` plus two hex digits. Distinct ids therefore
    /// never share a key, and the key is always a safe file stem.
    #[must_use]
    pub fn for_entity(display_name: &str, id: &EntityId) -> Self {
        Self(format!(
            "{}.{}",
            sanitize(display_name),
            escape_id(id.as_str())
        ))
    }

    /// Wraps a raw key without sanitizing it.
    ///
    /// Stores reject raw keys that are not safe file stems.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the record.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.0)
    }

    /// Returns true if the key cannot escape the records directory.
    ///
    /// Allows alphanumerics, `-`, `_` and single dots between segments.
    #[must_use]
    pub fn is_safe(&self) -> bool {
        let key = self.0.as_str();
        !key.is_empty()
            && key.len() <= 250
            && key.split('.').all(|segment| {
                !segment.is_empty()
                    && segment
                        .chars()
                        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
            })
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn sanitize(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

fn escape_id(raw: &str) -> String {
    if raw.is_empty() {
        return ID_ESCAPE.to_string();
    }
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_alphanumeric() || c == '_' {
            escaped.push(c);
        } else {
            let mut buf = [0; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(escaped, "{ID_ESCAPE}{byte:02x}");
            }
        }
    }
    escaped
}

/// Persistent home of attribute records.
///
/// # Implementor Notes
///
/// - Methods use `&self`; use interior mutability for in-process stores
/// - `read` returns `Ok(None)` when no record exists for the key
/// - `write` overwrites; there is no merge with prior content
pub trait RecordStore {
    /// Reads a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unsafe or the record cannot be read.
    fn read(&self, key: &RecordKey) -> Result<Option<String>>;

    /// Writes a record, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unsafe or the record cannot be written.
    fn write(&self, key: &RecordKey, text: &str) -> Result<()>;

    /// Returns true if a record exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be inspected.
    fn exists(&self, key: &RecordKey) -> Result<bool> {
        Ok(self.read(key)?.is_some())
    }
}
