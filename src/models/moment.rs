//! Exact in-game moments and the calendar that splits them.
//!
//! A [`Moment`] is a raw tick count. The [`Calendar`] defines how many ticks
//! make an hour, how many hours a day and so on, and converts between a
//! moment and its [`CalendarParts`] plus a sub-hour tick remainder:
//!
//! ```text
//! moment = compose(year, season, day, hour) + remainder
//! ```
//!
//! Decomposing and recomposing is exact, so exporting a birthday and
//! importing it unchanged never loses a tick.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticks per in-game second.
pub const TICKS_PER_SECOND: i64 = 10_000;

/// An exact instant measured in ticks since the calendar epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Moment(i64);

impl Moment {
    /// Creates a moment from a raw tick count.
    #[must_use]
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Returns the raw tick count.
    #[must_use]
    pub const fn ticks(self) -> i64 {
        self.0
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at the `i64` bounds.
    #[must_use]
    pub const fn ticks_since(self, earlier: Self) -> i64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Whole calendar components of a moment.
///
/// Components are signed so that hand-edited records with out-of-range
/// values still parse; the calendar folds them into ticks as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalendarParts {
    /// Year since the epoch.
    pub year: i32,
    /// Season of the year, `0` is spring.
    pub season: i32,
    /// Zero-based day of the season.
    pub day: i32,
    /// Hour of the day.
    pub hour: i32,
}

impl CalendarParts {
    /// Creates calendar parts.
    #[must_use]
    pub const fn new(year: i32, season: i32, day: i32, hour: i32) -> Self {
        Self {
            year,
            season,
            day,
            hour,
        }
    }
}

/// Unit sizes of the host calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    ticks_per_hour: i64,
    hours_per_day: i64,
    days_per_season: i64,
    seasons_per_year: i64,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            ticks_per_hour: TICKS_PER_SECOND * 3_600,
            hours_per_day: 24,
            days_per_season: 21,
            seasons_per_year: 4,
        }
    }
}

impl Calendar {
    /// Ticks in one hour.
    #[must_use]
    pub const fn ticks_per_hour(&self) -> i64 {
        self.ticks_per_hour
    }

    /// Ticks in one day.
    #[must_use]
    pub const fn ticks_per_day(&self) -> i64 {
        self.ticks_per_hour * self.hours_per_day
    }

    /// Ticks in one season.
    #[must_use]
    pub const fn ticks_per_season(&self) -> i64 {
        self.ticks_per_day() * self.days_per_season
    }

    /// Ticks in one year.
    #[must_use]
    pub const fn ticks_per_year(&self) -> i64 {
        self.ticks_per_season() * self.seasons_per_year
    }

    /// Builds the moment at the start of the given hour.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MomentOutOfRange`] if the result does not fit in the
    /// tick range.
    pub fn compose(&self, parts: CalendarParts) -> Result<Moment> {
        let years = scale(parts.year, self.ticks_per_year(), "Year")?;
        let seasons = scale(parts.season, self.ticks_per_season(), "Season")?;
        let days = scale(parts.day, self.ticks_per_day(), "Day")?;
        let hours = scale(parts.hour, self.ticks_per_hour, "Hour")?;

        [seasons, days, hours]
            .into_iter()
            .zip(["Season", "Day", "Hour"])
            .try_fold(years, |acc, (ticks, field)| {
                acc.checked_add(ticks)
                    .ok_or(Error::MomentOutOfRange { field })
            })
            .map(Moment::from_ticks)
    }

    /// Builds an exact moment from whole parts plus a tick remainder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MomentOutOfRange`] if the result does not fit in the
    /// tick range.
    pub fn compose_exact(&self, parts: CalendarParts, remaining_ticks: i64) -> Result<Moment> {
        let whole = self.compose(parts)?;
        whole
            .ticks()
            .checked_add(remaining_ticks)
            .map(Moment::from_ticks)
            .ok_or(Error::MomentOutOfRange {
                field: "RemainingTicks",
            })
    }

    /// Splits a moment into whole parts and the sub-hour tick remainder.
    ///
    /// The remainder is the exact moment minus the recomposed whole parts, so
    /// `compose_exact(decompose(m))` always returns `m`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MomentOutOfRange`] if the year does not fit in `i32`.
    pub fn decompose(&self, moment: Moment) -> Result<(CalendarParts, i64)> {
        let ticks = moment.ticks();
        let year = ticks.div_euclid(self.ticks_per_year());
        let within_year = ticks.rem_euclid(self.ticks_per_year());
        let season = within_year / self.ticks_per_season();
        let within_season = within_year % self.ticks_per_season();
        let day = within_season / self.ticks_per_day();
        let hour = (within_season % self.ticks_per_day()) / self.ticks_per_hour;

        let parts = CalendarParts {
            year: narrow(year, "Year")?,
            season: narrow(season, "Season")?,
            day: narrow(day, "Day")?,
            hour: narrow(hour, "Hour")?,
        };
        let whole = self.compose(parts)?;
        Ok((parts, moment.ticks_since(whole)))
    }

    /// Age in (fractional) years between a birth moment and `now`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn years_between(&self, birth: Moment, now: Moment) -> f32 {
        let elapsed = now.ticks_since(birth) as f64;
        (elapsed / self.ticks_per_year() as f64) as f32
    }

    /// Human-readable rendering such as `Summer 6, 1084`.
    ///
    /// Only meant for display; the exact value lives in the parts and
    /// remainder.
    #[must_use]
    pub fn format(&self, moment: Moment) -> String {
        match self.decompose(moment) {
            Ok((parts, _)) => format!(
                "{} {}, {}",
                self.season_name(parts.season),
                i64::from(parts.day) + 1,
                parts.year
            ),
            Err(_) => format!("{} ticks", moment.ticks()),
        }
    }

    fn season_name(&self, season: i32) -> String {
        const NAMES: [&str; 4] = ["Spring", "Summer", "Autumn", "Winter"];
        if self.seasons_per_year == 4 {
            if let Some(name) = usize::try_from(season).ok().and_then(|i| NAMES.get(i)) {
                return (*name).to_string();
            }
        }
        format!("Season {season}")
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Calendar::default().format(*self))
    }
}

fn scale(count: i32, unit: i64, field: &'static str) -> Result<i64> {
    i64::from(count)
        .checked_mul(unit)
        .ok_or(Error::MomentOutOfRange { field })
}

fn narrow(value: i64, field: &'static str) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::MomentOutOfRange { field })
}
