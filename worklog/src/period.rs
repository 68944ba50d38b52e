//! Turns a free form period expression, like `2020 Q3`, `June 2020` or `2020-06-17`, into
//! the closed interval of local time it covers.
use chrono::offset::TimeZone;
use chrono::{DateTime, Datelike, Days, Local, Month, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::WorklogError;

/// A closed interval with second granularity, anchored to the first and last instant of a
/// quarter, a month or a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePeriod {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

/// The calendar unit an expression was recognised as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CalendarUnit {
    Quarter { year: i32, quarter: u32 },
    Month { year: i32, month: u32 },
    Day(NaiveDate),
}

impl TimePeriod {
    /// Parses `expr`, trying the quarter grammar first, then the month grammar and finally
    /// the day grammar. The whole string must match.
    ///
    /// # Errors
    /// `WorklogError::InvalidPeriod` if no grammar matches or the dates do not exist
    pub fn resolve(expr: &str) -> Result<TimePeriod, WorklogError> {
        let invalid = || WorklogError::InvalidPeriod(expr.to_string());

        let unit = parse_unit(expr.trim()).ok_or_else(invalid)?;
        let (first, last) = unit.first_and_last_day().ok_or_else(invalid)?;

        let start = first.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        let end = last.and_hms_opt(23, 59, 59).ok_or_else(invalid)?;
        Ok(TimePeriod {
            start: local(&start, true).ok_or_else(invalid)?,
            end: local(&end, false).ok_or_else(invalid)?,
        })
    }

    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        self.end.date_naive()
    }
}

impl Display for TimePeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.first_day().format("%Y-%m-%d"),
            self.last_day().format("%Y-%m-%d")
        )
    }
}

// Midnight may be ambiguous, or missing altogether, when the clocks change
fn local(naive: &NaiveDateTime, earliest: bool) -> Option<DateTime<Local>> {
    let mapped = Local.from_local_datetime(naive);
    if earliest {
        mapped.earliest()
    } else {
        mapped.latest()
    }
}

fn parse_unit(s: &str) -> Option<CalendarUnit> {
    lazy_static! {
        static ref QUARTER_EXPR: Regex =
            Regex::new(r"(?i)^(\d{4})(?:,\s*|\s+|-)q([1-4])$").unwrap();
        static ref QUARTER_FIRST_EXPR: Regex = Regex::new(r"(?i)^q([1-4])\s+(\d{4})$").unwrap();
        static ref MONTH_EXPR: Regex = Regex::new(r"^(\d{4})[- ](\d{2})$").unwrap();
        static ref MONTH_NAME_EXPR: Regex = Regex::new(r"(?i)^([a-z]+),?\s+(\d{4})$").unwrap();
        static ref DAY_EXPR: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    }

    if let Some(c) = QUARTER_EXPR.captures(s) {
        return Some(CalendarUnit::Quarter {
            year: c[1].parse().ok()?,
            quarter: c[2].parse().ok()?,
        });
    }
    if let Some(c) = QUARTER_FIRST_EXPR.captures(s) {
        return Some(CalendarUnit::Quarter {
            year: c[2].parse().ok()?,
            quarter: c[1].parse().ok()?,
        });
    }
    if let Some(c) = MONTH_EXPR.captures(s) {
        return Some(CalendarUnit::Month {
            year: c[1].parse().ok()?,
            month: c[2].parse().ok()?,
        });
    }
    if let Some(c) = MONTH_NAME_EXPR.captures(s) {
        let month = Month::from_str(&c[1]).ok()?;
        return Some(CalendarUnit::Month {
            year: c[2].parse().ok()?,
            month: month.number_from_month(),
        });
    }
    if DAY_EXPR.is_match(s) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(CalendarUnit::Day);
    }
    None
}

impl CalendarUnit {
    fn first_and_last_day(self) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            CalendarUnit::Quarter { year, quarter } => {
                let first_month = (quarter - 1) * 3 + 1;
                let first = NaiveDate::from_ymd_opt(year, first_month, 1)?;
                let (_, last) = CalendarUnit::Month {
                    year,
                    month: first_month + 2,
                }
                .first_and_last_day()?;
                Some((first, last))
            }
            CalendarUnit::Month { year, month } => {
                let first = NaiveDate::from_ymd_opt(year, month, 1)?;
                let next = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)?
                };
                Some((first, next.checked_sub_days(Days::new(1))?))
            }
            CalendarUnit::Day(date) => Some((date, date)),
        }
    }
}
