//! Day/month/year date handling for lab report tokens.
//!
//! Lab reports write dates as `D/M/YYYY`. The format is fixed: no locale
//! guessing, no month-first fallback. Values outside the calendar (day 31 in
//! a 30-day month, month 13) are rolled over into the following days/months
//! so the row still carries a date, and the caller reports them as ambiguous.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use regex::Regex;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").expect("date pattern is valid")
});

/// A date read from a `D/M/YYYY` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    /// A real calendar date.
    Exact(NaiveDate),
    /// Out-of-range day or month, normalized by rolling over.
    RolledOver(NaiveDate),
}

impl ParsedDate {
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Exact(d) | Self::RolledOver(d) => *d,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }
}

/// True if the token contains a `D/M/YYYY` shaped date anywhere.
pub fn looks_like_date(token: &str) -> bool {
    DATE_RE.is_match(token)
}

/// Parse the first `D/M/YYYY` date found in `token`.
pub fn parse_dmy(token: &str) -> Option<ParsedDate> {
    let caps = DATE_RE.captures(token)?;
    let whole = caps.get(0)?.as_str();

    if let Ok(d) = NaiveDate::parse_from_str(whole, "%d/%m/%Y") {
        return Some(ParsedDate::Exact(d));
    }

    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    roll_over(day, month, year).map(ParsedDate::RolledOver)
}

/// Midnight UTC on the given date.
pub fn start_of_day_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Normalize an out-of-range day/month the way calendar arithmetic would:
/// 31/4 becomes 1/5, month 13 becomes January of the next year, day 0 is the
/// last day of the previous month.
fn roll_over(day: u32, month: u32, year: i32) -> Option<NaiveDate> {
    let months = i64::from(year) * 12 + i64::from(month) - 1;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_signed(Duration::days(i64::from(day) - 1))
}
