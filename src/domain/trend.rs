//! Trend classification from the mean of `Open` and the last observation.
//!
//! mean > last  => decrease
//! mean < last  => increase
//! otherwise    => stable
//!
//! "Last" is the final document in retrieval order, not the latest `Date`.

use crate::domain::document::Document;
use crate::domain::error::PriceTrendError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increase,
    Decrease,
    Stable,
}

impl Trend {
    /// Compares the average to the latest value. A missing latest value
    /// compares neither above nor below, so it is stable.
    pub fn classify(mean: f64, last: Option<f64>) -> Self {
        match last {
            Some(last) if mean > last => Trend::Decrease,
            Some(last) if mean < last => Trend::Increase,
            _ => Trend::Stable,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::Increase => "increase",
            Trend::Decrease => "decrease",
            Trend::Stable => "stable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    /// Number of documents in the window, including those without `Open`.
    pub data_points: usize,
    pub trend: Trend,
}

/// Arithmetic mean of the present `Open` values.
pub fn mean_open(docs: &[Document]) -> Result<Option<f64>, PriceTrendError> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for doc in docs {
        if let Some(open) = doc.open()? {
            sum += open;
            count += 1;
        }
    }
    Ok((count > 0).then(|| sum / count as f64))
}

pub fn compute_trend(docs: &[Document]) -> Result<TrendSummary, PriceTrendError> {
    let last_doc = docs.last().ok_or(PriceTrendError::NoData)?;
    let mean = mean_open(docs)?.ok_or(PriceTrendError::MissingColumn)?;
    let last = last_doc.open()?;

    Ok(TrendSummary {
        data_points: docs.len(),
        trend: Trend::classify(mean, last),
    })
}
