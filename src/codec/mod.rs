//! Attribute record codec.
//!
//! Records are plain UTF-8 text, one `Key=Value` pair per line, with `//`
//! comment lines documenting each section:
//!
//! ```text
//! //Lines started with // are comments.
//!
//! //Aldric's birthday:
//! Year=1084
//! Season=2
//! ...
//! ```
//!
//! [`decode`] is tolerant: comments, blank lines and lines without `=` are
//! skipped. [`encode`] writes a fixed section layout driven by
//! [`schema::SCHEMA`]. Neither side interprets values; typed conversion is
//! done by the import pipeline through [`schema::KeySpec::convert`].

pub mod schema;

use crate::models::{TICKS_PER_SECOND, TraitRange};
use schema::{KeyGroup, SCHEMA};
use std::collections::HashSet;
use std::fmt::Write as _;

/// Prefix of a comment line.
pub const COMMENT_MARKER: &str = "//";

/// Separator between key and value.
pub const SEPARATOR: char = '=';

/// Ordered `key=value` pairs read from or written to a record.
///
/// Duplicate keys are kept in insertion order; [`AttributeRecord::get`]
/// returns the last one, which is what a reader scanning the file top to
/// bottom would end up with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRecord {
    entries: Vec<(String, String)>,
}

impl AttributeRecord {
    /// Creates an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Appends an entry, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value.to_string());
        self
    }

    /// Returns the last value recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if `key` appears at least once.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterates entries in insertion order, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the record has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Context the encoder needs for section comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMetadata {
    /// Display name of the entity the record belongs to.
    pub display_name: String,
    /// Whether the entity is the tracked entity.
    pub tracked: bool,
    /// Trait range mentioned in the readme.
    pub trait_range: TraitRange,
}

impl RecordMetadata {
    /// Creates metadata for an untracked entity with the default trait range.
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            tracked: false,
            trait_range: TraitRange::default(),
        }
    }

    /// Marks the entity as tracked.
    #[must_use]
    pub const fn with_tracked(mut self, tracked: bool) -> Self {
        self.tracked = tracked;
        self
    }

    /// Sets the trait range.
    #[must_use]
    pub const fn with_trait_range(mut self, range: TraitRange) -> Self {
        self.trait_range = range;
        self
    }
}

/// Parses record text.
///
/// Each line is trimmed. Blank lines, lines starting with `//` and lines
/// without `=` are skipped. The first `=` splits key from value, both are
/// trimmed, and lines with an empty key are skipped.
#[must_use]
pub fn decode(text: &str) -> AttributeRecord {
    let mut record = AttributeRecord::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }
        let Some((key, value)) = line.split_once(SEPARATOR) else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        record.push(key, value.trim());
    }
    record
}

/// Renders a record as commented text.
///
/// Sections follow [`KeyGroup::all`]. Within a section keys appear in schema
/// order; keys absent from the record are omitted, and a section with no
/// keys present is left out entirely. Keys outside the schema are appended
/// to the informational section in record order.
#[must_use]
pub fn encode(record: &AttributeRecord, metadata: &RecordMetadata) -> String {
    let mut out = String::new();
    write_readme(&mut out, metadata);

    for group in KeyGroup::all() {
        let mut lines: Vec<(&str, &str)> = schema::keys_in(*group)
            .filter_map(|spec| record.get(spec.key).map(|value| (spec.key, value)))
            .collect();
        if *group == KeyGroup::Informational {
            lines.extend(unknown_entries(record));
        }
        if lines.is_empty() {
            continue;
        }

        out.push('\n');
        let _ = writeln!(out, "{COMMENT_MARKER}{}", section_title(*group, metadata));
        for (key, value) in lines {
            let _ = writeln!(out, "{key}{SEPARATOR}{}", single_line(value));
        }
    }
    out
}

fn write_readme(out: &mut String, metadata: &RecordMetadata) {
    let range = metadata.trait_range;
    for line in [
        "Lines started with // are comments.".to_string(),
        String::new(),
        "Readme:".to_string(),
        "Season ranges from 0 to 3. Spring is 0 and Autumn is 2, for example.".to_string(),
        "Day starts with 0. So if your birthday is Summer 11, Day should be 10.".to_string(),
        format!(
            "Use the field \"{}\" to check what your birthday is, after export.",
            schema::FORMATTED_BIRTHDAY
        ),
        format!(
            "If you want to modify RemainingTicks, remember there are {TICKS_PER_SECOND} ticks per game second."
        ),
        format!("Traits range from {} to {}.", range.min, range.max),
    ] {
        if line.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "{COMMENT_MARKER}{line}");
        }
    }
}

fn section_title(group: KeyGroup, metadata: &RecordMetadata) -> String {
    match group {
        KeyGroup::Birthday => format!("{}'s birthday:", single_line(&metadata.display_name)),
        KeyGroup::Lineage => "Culture:".to_string(),
        KeyGroup::TraitLevels if metadata.tracked => {
            "Traits (Read only. Modify Trait XP to change traits):".to_string()
        },
        KeyGroup::TraitLevels => "Traits:".to_string(),
        KeyGroup::TraitExperience => "Trait XP:".to_string(),
        KeyGroup::Informational => "Don't modify this section as it will not be read.".to_string(),
    }
}

/// Replaces line breaks and other control characters with spaces, so a name
/// or value cannot spill onto a line of its own.
fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Entries whose key is not in the schema, first occurrence order, last value.
fn unknown_entries(record: &AttributeRecord) -> Vec<(&str, &str)> {
    let mut seen = HashSet::new();
    record
        .iter()
        .filter(|(key, _)| !SCHEMA.iter().any(|spec| spec.key == *key))
        .filter(|(key, _)| seen.insert(*key))
        .filter_map(|(key, _)| record.get(key).map(|value| (key, value)))
        .collect()
}
