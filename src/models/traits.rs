//! Bounded personality traits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// The five personality traits a record governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    /// Mercy.
    Mercy,
    /// Valor.
    Valor,
    /// Honor.
    Honor,
    /// Generosity.
    Generosity,
    /// Calculating.
    Calculating,
}

impl Trait {
    /// Returns all traits in record order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Mercy,
            Self::Valor,
            Self::Honor,
            Self::Generosity,
            Self::Calculating,
        ]
    }

    /// Returns the record key holding the trait level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mercy => "Mercy",
            Self::Valor => "Valor",
            Self::Honor => "Honor",
            Self::Generosity => "Generosity",
            Self::Calculating => "Calculating",
        }
    }

    /// Returns the record key holding the trait experience total.
    #[must_use]
    pub const fn xp_key(&self) -> &'static str {
        match self {
            Self::Mercy => "MercyXP",
            Self::Valor => "ValorXP",
            Self::Honor => "HonorXP",
            Self::Generosity => "GenerosityXP",
            Self::Calculating => "CalculatingXP",
        }
    }

    /// Record key of the informational experience threshold for `level`.
    #[must_use]
    pub fn xp_required_key(&self, level: i32) -> String {
        format!("{}XPRequired{level}", self.as_str())
    }

    /// Position of the trait in record order.
    #[must_use]
    pub const fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive range of valid levels for a trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitRange {
    /// Lowest level.
    pub min: i32,
    /// Highest level.
    pub max: i32,
}

impl Default for TraitRange {
    fn default() -> Self {
        Self { min: -2, max: 2 }
    }
}

impl TraitRange {
    /// Creates a range, swapping the bounds if given in reverse.
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Clamps a level into the range.
    #[must_use]
    pub const fn clamp(&self, level: i32) -> i32 {
        if level < self.min {
            self.min
        } else if level > self.max {
            self.max
        } else {
            level
        }
    }

    /// Every level in the range, lowest first.
    #[must_use]
    pub const fn levels(&self) -> RangeInclusive<i32> {
        self.min..=self.max
    }
}

/// One value per trait, in record order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraitValues([i32; 5]);

impl TraitValues {
    /// Creates values from an array in record order.
    #[must_use]
    pub const fn new(values: [i32; 5]) -> Self {
        Self(values)
    }

    /// Returns the value for a trait.
    #[must_use]
    pub const fn get(&self, t: Trait) -> i32 {
        self.0[t.index()]
    }

    /// Sets the value for a trait.
    pub const fn set(&mut self, t: Trait, value: i32) {
        self.0[t.index()] = value;
    }

    /// Iterates `(trait, value)` pairs in record order.
    pub fn iter(&self) -> impl Iterator<Item = (Trait, i32)> + '_ {
        Trait::all().iter().map(|t| (*t, self.get(*t)))
    }
}
