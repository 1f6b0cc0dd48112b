//! Season classification.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// One of the four fixed three-month calendar partitions.
///
/// Ordered as winter, spring, summer, autumn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Autumn];

    /// Map a calendar month (1 to 12) to its season.
    ///
    /// # Panics
    /// Panics if `month` is outside `1..=12`.
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => unreachable!("month must be in the range 1..=12, but is {month}"),
        }
    }

    /// Season of any date-like value.
    pub fn of<D: Datelike>(date: &D) -> Self {
        season_of(date.month())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }
}

/// Shorthand for [`Season::from_month`].
pub fn season_of(month: u32) -> Season {
    Season::from_month(month)
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Season::ALL
            .into_iter()
            .find(|season| season.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown season {s:?}, expected one of winter, spring, summer, autumn"))
    }
}

/// Source of the current date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock frozen at a given date.
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Season the clock is currently in.
pub fn current_season(clock: &dyn Clock) -> Season {
    Season::of(&clock.today())
}
