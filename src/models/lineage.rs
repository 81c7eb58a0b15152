//! Lineage (culture) tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-native lineage code.
///
/// Codes are stored lowercase so that `Aserai`, `aserai` and `ASERAI` in a
/// record all resolve to the same lineage. Whether a code is known is up to
/// the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LineageCode(String);

impl LineageCode {
    /// Normalizes a raw value into a code.
    ///
    /// Returns `None` for blank input and for the reserved `invalid` label.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_lowercase();
        if code.is_empty() || code == "invalid" {
            return None;
        }
        Some(Self(code))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LineageCode {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw).ok_or_else(|| format!("invalid lineage code '{raw}'"))
    }
}

impl From<LineageCode> for String {
    fn from(code: LineageCode) -> Self {
        code.0
    }
}

impl fmt::Display for LineageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
