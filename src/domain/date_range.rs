//! UTC date ranges and the strict request timestamp format.
//!
//! Request dates must look like `2023-09-01T00:00:00.000Z`: a literal `T`
//! separator, one to six fractional digits and a literal `Z`. Stored instants
//! are written with exactly six fractional digits so their text sorts in
//! chronological order.

use crate::domain::error::PriceTrendError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

const BASE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const STORED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";
const MAX_FRACTION_DIGITS: usize = 6;

/// Inclusive pair of UTC instants. `start > end` is allowed and selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

/// Parse a request timestamp in the strict `%Y-%m-%dT%H:%M:%S.%fZ` format.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, PriceTrendError> {
    let body = input
        .strip_suffix('Z')
        .ok_or(PriceTrendError::InvalidDateFormat)?;
    let (base, fraction) = body
        .rsplit_once('.')
        .ok_or(PriceTrendError::InvalidDateFormat)?;

    if fraction.is_empty()
        || fraction.len() > MAX_FRACTION_DIGITS
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(PriceTrendError::InvalidDateFormat);
    }

    let naive = NaiveDateTime::parse_from_str(base, BASE_FORMAT)
        .map_err(|_| PriceTrendError::InvalidDateFormat)?;

    // "5" means 500ms, so pad on the right to nanoseconds.
    let nanos: u32 = format!("{fraction:0<9}")
        .parse()
        .map_err(|_| PriceTrendError::InvalidDateFormat)?;
    let naive = naive
        .with_nanosecond(nanos)
        .ok_or(PriceTrendError::InvalidDateFormat)?;

    Ok(naive.and_utc())
}

/// Canonical text form of a stored instant.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format(STORED_FORMAT).to_string()
}

/// Lenient parse used for stored `Date` values: the request format, any
/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` date at midnight UTC.
pub fn parse_stored_instant(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = parse_timestamp(input) {
        return Some(instant);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}
