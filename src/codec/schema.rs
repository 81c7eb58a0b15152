//! Declarative key schema for attribute records.
//!
//! Every key the import pipeline understands is listed once in [`SCHEMA`],
//! together with the attribute group it belongs to and the kind of value it
//! holds. The encoder uses the same table to lay out sections, so adding a
//! key here is enough for it to be exported and parsed.
//!
//! # Keys
//!
//! | Group | Keys | Kind |
//! |-------|------|------|
//! | Birthday | `Year`, `Season`, `Day`, `Hour` | `Int32` |
//! | Birthday | `RemainingTicks` | `Int64` |
//! | Lineage | `Culture` | `Text` |
//! | Trait levels | `Mercy` .. `Calculating` | `Int32` |
//! | Trait experience | `MercyXP` .. `CalculatingXP` | `Int32` |
//! | Informational | `FormattedBirthday` | `Text` |

use crate::{Error, Result};

/// Attribute group a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyGroup {
    /// Birth moment parts and tick remainder.
    Birthday,
    /// Lineage tag.
    Lineage,
    /// Direct trait levels.
    TraitLevels,
    /// Trait experience totals of the tracked entity.
    TraitExperience,
    /// Written for humans, never read back.
    Informational,
}

impl KeyGroup {
    /// Groups in the order their sections appear in a record.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Birthday,
            Self::Lineage,
            Self::TraitLevels,
            Self::TraitExperience,
            Self::Informational,
        ]
    }

    /// Returns true if an import reads this group's keys for an entity.
    ///
    /// The tracked entity's traits are driven by experience, so its level
    /// keys are ignored on import and its experience keys read instead.
    #[must_use]
    pub const fn is_read_on_import(self, tracked: bool) -> bool {
        match self {
            Self::Birthday | Self::Lineage => true,
            Self::TraitLevels => !tracked,
            Self::TraitExperience => tracked,
            Self::Informational => false,
        }
    }
}

/// Type a value must convert to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// Free text, taken as written.
    Text,
}

/// A converted record value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// Free text.
    Text(String),
}

impl TypedValue {
    /// Returns the integer payload widened to `i64`, if numeric.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int32(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Returns the `i32` payload.
    #[must_use]
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One governed record key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    /// Exact, case-sensitive key.
    pub key: &'static str,
    /// Group the key belongs to.
    pub group: KeyGroup,
    /// Kind of value it holds.
    pub kind: ValueKind,
}

impl KeySpec {
    const fn new(key: &'static str, group: KeyGroup, kind: ValueKind) -> Self {
        Self { key, group, kind }
    }

    /// Converts a raw value to this key's kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailure`] naming the key if the value is not a
    /// valid number of the expected width.
    pub fn convert(&self, raw: &str) -> Result<TypedValue> {
        let failure = || Error::ParseFailure {
            key: self.key.to_string(),
            value: raw.to_string(),
        };
        match self.kind {
            ValueKind::Int32 => raw.parse().map(TypedValue::Int32).map_err(|_| failure()),
            ValueKind::Int64 => raw.parse().map(TypedValue::Int64).map_err(|_| failure()),
            ValueKind::Text => Ok(TypedValue::Text(raw.to_string())),
        }
    }
}

/// Birth year.
pub const YEAR: &str = "Year";
/// Season of the year.
pub const SEASON: &str = "Season";
/// Day of the season.
pub const DAY: &str = "Day";
/// Hour of the day.
pub const HOUR: &str = "Hour";
/// Ticks below one hour.
pub const REMAINING_TICKS: &str = "RemainingTicks";
/// Lineage tag.
pub const CULTURE: &str = "Culture";
/// Display rendering of the birth moment.
pub const FORMATTED_BIRTHDAY: &str = "FormattedBirthday";

/// Every governed key, in record order.
pub const SCHEMA: &[KeySpec] = &[
    KeySpec::new(YEAR, KeyGroup::Birthday, ValueKind::Int32),
    KeySpec::new(SEASON, KeyGroup::Birthday, ValueKind::Int32),
    KeySpec::new(DAY, KeyGroup::Birthday, ValueKind::Int32),
    KeySpec::new(HOUR, KeyGroup::Birthday, ValueKind::Int32),
    KeySpec::new(REMAINING_TICKS, KeyGroup::Birthday, ValueKind::Int64),
    KeySpec::new(CULTURE, KeyGroup::Lineage, ValueKind::Text),
    KeySpec::new("Mercy", KeyGroup::TraitLevels, ValueKind::Int32),
    KeySpec::new("Valor", KeyGroup::TraitLevels, ValueKind::Int32),
    KeySpec::new("Honor", KeyGroup::TraitLevels, ValueKind::Int32),
    KeySpec::new("Generosity", KeyGroup::TraitLevels, ValueKind::Int32),
    KeySpec::new("Calculating", KeyGroup::TraitLevels, ValueKind::Int32),
    KeySpec::new("MercyXP", KeyGroup::TraitExperience, ValueKind::Int32),
    KeySpec::new("ValorXP", KeyGroup::TraitExperience, ValueKind::Int32),
    KeySpec::new("HonorXP", KeyGroup::TraitExperience, ValueKind::Int32),
    KeySpec::new("GenerosityXP", KeyGroup::TraitExperience, ValueKind::Int32),
    KeySpec::new("CalculatingXP", KeyGroup::TraitExperience, ValueKind::Int32),
    KeySpec::new(FORMATTED_BIRTHDAY, KeyGroup::Informational, ValueKind::Text),
];

/// Looks up a governed key.
#[must_use]
pub fn lookup(key: &str) -> Option<&'static KeySpec> {
    SCHEMA.iter().find(|spec| spec.key == key)
}

/// Keys of one group, in record order.
pub fn keys_in(group: KeyGroup) -> impl Iterator<Item = &'static KeySpec> {
    SCHEMA.iter().filter(move |spec| spec.group == group)
}
