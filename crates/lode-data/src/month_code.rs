//! Month-code parsing.
//!
//! Statistical releases label monthly columns with compact tokens such as
//! `MO012020` (prefix `MO`, two-digit month, four-digit year). This module
//! turns those tokens into a canonical [`YearMonth`]. Anything that does not
//! have exactly that shape parses to `None`: metadata columns and header noise
//! are expected and are filtered by the callers, never reported as errors.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static MONTH_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^MO(\d{2})(\d{4})$").expect("valid month-code pattern"));

static EMBEDDED_MONTH_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9])(MO\d{6})(?:$|[^A-Za-z0-9])")
        .expect("valid embedded month-code pattern")
});

/// A calendar month, the key of every panel row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Month of year, 1-12.
    pub month: u32,
}

impl YearMonth {
    /// Create a year-month, or `None` when the month is outside 1-12.
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if matches!(month, 1..=12) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Period floor of a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month, used as the panel date key.
    pub fn first_day(self) -> NaiveDate {
        // month is always 1-12, day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Shift by a signed number of months.
    pub const fn add_months(self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: (index.rem_euclid(12) + 1) as u32,
        }
    }

    /// Number of months from `self` to `other` (negative when `other` is earlier).
    pub const fn months_until(self, other: Self) -> i32 {
        (other.year - self.year) * 12 + (other.month as i32 - self.month as i32)
    }

    /// Days since 1970-01-01 of the first day of the month, the physical
    /// representation of a polars `Date`.
    pub fn epoch_days(self) -> i32 {
        (self.first_day() - unix_epoch()).num_days() as i32
    }

    /// Inverse of [`YearMonth::epoch_days`], flooring to the month.
    pub fn from_epoch_days(days: i32) -> Self {
        Self::from_date(unix_epoch() + chrono::Duration::days(i64::from(days)))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Parse a month token such as `MO012020`.
///
/// Surrounding whitespace is ignored. Returns `None` for any other shape,
/// including month `00` or above `12`.
pub fn parse_month_code(token: &str) -> Option<YearMonth> {
    let caps = MONTH_CODE.captures(token.trim())?;
    let month: u32 = caps[1].parse().ok()?;
    let year: i32 = caps[2].parse().ok()?;
    YearMonth::new(year, month)
}

/// Locate and parse a month token embedded in a longer header, e.g.
/// `"Volume MO032019"`.
pub fn find_month_code(header: &str) -> Option<YearMonth> {
    let caps = EMBEDDED_MONTH_CODE.captures(header)?;
    parse_month_code(&caps[1])
}
