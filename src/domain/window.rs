//! Trailing window parsing.
//!
//! A window is `<integer><unit>` with unit `d`, `h` or `m`, e.g. `7d`, `24h`,
//! `1440m`. The resulting range always ends at the supplied instant.

use crate::domain::date_range::DateRange;
use crate::domain::error::PriceTrendError;
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::str::FromStr;

/// Minute windows shorter than one day are rejected.
pub const MIN_MINUTE_WINDOW: i64 = 1440;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowUnit {
    Day,
    Hour,
    Minute,
}

impl WindowUnit {
    fn suffix(self) -> char {
        match self {
            WindowUnit::Day => 'd',
            WindowUnit::Hour => 'h',
            WindowUnit::Minute => 'm',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub magnitude: i64,
    pub unit: WindowUnit,
}

impl Window {
    pub fn duration(&self) -> Option<TimeDelta> {
        match self.unit {
            WindowUnit::Day => TimeDelta::try_days(self.magnitude),
            WindowUnit::Hour => TimeDelta::try_hours(self.magnitude),
            WindowUnit::Minute => TimeDelta::try_minutes(self.magnitude),
        }
    }

    /// `[now - duration, now]`.
    pub fn range_ending_at(&self, now: DateTime<Utc>) -> Result<DateRange, PriceTrendError> {
        let start = self
            .duration()
            .and_then(|d| now.checked_sub_signed(d))
            .ok_or(PriceTrendError::InvalidParameterFormat)?;
        Ok(DateRange::new(start, now))
    }
}

impl FromStr for Window {
    type Err = PriceTrendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit_char = s
            .chars()
            .last()
            .ok_or(PriceTrendError::InvalidParameterFormat)?;
        let digits = &s[..s.len() - unit_char.len_utf8()];

        // The magnitude is validated before the unit.
        let magnitude: i64 = digits
            .parse()
            .map_err(|_| PriceTrendError::InvalidParameterFormat)?;

        let unit = match unit_char {
            'd' => WindowUnit::Day,
            'h' => WindowUnit::Hour,
            'm' => WindowUnit::Minute,
            _ => return Err(PriceTrendError::InvalidPeriodIndicator),
        };

        if unit == WindowUnit::Minute && magnitude < MIN_MINUTE_WINDOW {
            return Err(PriceTrendError::InvalidWindowForMinutes);
        }
        if magnitude <= 0 {
            return Err(PriceTrendError::InvalidParameterFormat);
        }

        Ok(Window { magnitude, unit })
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.suffix())
    }
}

pub fn parse_window(text: &str) -> Result<Window, PriceTrendError> {
    text.parse()
}
