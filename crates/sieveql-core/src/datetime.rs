//! ISO date parsing for predicate literals.
//!
//! Query values may name a whole period rather than a single day: `2000`
//! means all of the year 2000 and `2000-02` all of February 2000. Every
//! period is represented as a closed-open interval `[start, end)` so the
//! final day is included without juggling month lengths at call sites.
//! Explicit intervals use a comma (`1989,2000`), with `*` for an open end.

use chrono::NaiveDate;

use crate::columns::{Term, TermKind};
use crate::error::{Error, Result};

/// A closed-open date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInterval {
    /// Inclusive start, `None` when unbounded below.
    pub start: Option<NaiveDate>,
    /// Exclusive end, `None` when unbounded above.
    pub end: Option<NaiveDate>,
}

/// Parses a literal date period: `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
///
/// Returns the closed-open interval the period covers.
pub fn parse_period(value: &str) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || Error::InvalidValue(format!("invalid ISO date '{value}'"));
    let mut parts = value.splitn(3, '-');

    let year: i32 = parts
        .next()
        .filter(|y| y.len() == 4)
        .and_then(|y| y.parse().ok())
        .ok_or_else(invalid)?;

    let Some(month_part) = parts.next() else {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
        let end = NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or_else(invalid)?;
        return Ok((start, end));
    };
    let month: u32 = month_part.parse().map_err(|_| invalid())?;

    let Some(day_part) = parts.next() else {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid)?;
        return Ok((start, end));
    };
    let day: u32 = day_part.parse().map_err(|_| invalid())?;
    let start = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
    let end = start.succ_opt().ok_or_else(invalid)?;
    Ok((start, end))
}

/// Parses a date literal to the first day of its period.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    parse_period(value).map(|(start, _)| start)
}

/// Parses a date literal or explicit interval into a closed-open interval.
///
/// A single period covers itself; `a,b` covers `[a.start, b.end)`; `*`
/// leaves an end unbounded.
pub fn parse_interval(value: &str) -> Result<DateInterval> {
    if let Some((lower, upper)) = value.split_once(',') {
        let start = if lower.trim() == "*" {
            None
        } else {
            Some(parse_period(lower.trim())?.0)
        };
        let end = if upper.trim() == "*" {
            None
        } else {
            Some(parse_period(upper.trim())?.1)
        };
        if start.is_none() && end.is_none() {
            return Err(Error::InvalidValue(format!(
                "date interval '{value}' has no bound"
            )));
        }
        return Ok(DateInterval { start, end });
    }
    let (start, end) = parse_period(value)?;
    Ok(DateInterval {
        start: Some(start),
        end: Some(end),
    })
}

/// True if the literal uses the explicit interval syntax.
#[must_use]
pub fn is_interval(value: &str) -> bool {
    value.contains(',')
}

/// Converts a date to the epoch representation of the given column.
///
/// Seconds-epoch columns get seconds at UTC midnight; milliseconds-epoch
/// columns get milliseconds.
#[must_use]
pub fn epoch_value(date: NaiveDate, term: Term) -> i64 {
    let midnight = date.and_time(chrono::NaiveTime::MIN).and_utc();
    match term.kind {
        TermKind::UtcDateMillis => midnight.timestamp_millis(),
        _ => midnight.timestamp(),
    }
}

/// ISO rendering (`YYYY-MM-DD`) used for search-engine range bounds.
#[must_use]
pub fn iso_value(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
