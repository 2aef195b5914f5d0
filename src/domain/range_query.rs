//! Inclusive `Date` range filters handed to the document store.

use crate::domain::date_range::{DateRange, format_instant};
use crate::domain::document::Document;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeFilter {
    pub range: DateRange,
}

impl RangeFilter {
    pub fn start(&self) -> DateTime<Utc> {
        self.range.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.range.end
    }

    /// `start <= instant <= end`
    pub fn matches(&self, instant: DateTime<Utc>) -> bool {
        self.range.start <= instant && instant <= self.range.end
    }

    /// Documents without a readable `Date` never match.
    pub fn matches_document(&self, doc: &Document) -> bool {
        doc.date().is_some_and(|date| self.matches(date))
    }

    /// Bounds in stored text form, for stores that compare `Date` as text.
    pub fn text_bounds(&self) -> (String, String) {
        (format_instant(self.range.start), format_instant(self.range.end))
    }
}

pub fn build_filter(range: DateRange) -> RangeFilter {
    RangeFilter { range }
}
