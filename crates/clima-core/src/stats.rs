//! Summary statistics over a city series

use crate::{AnalysisError, AnalysisResult, CitySeries, DateRange, Metric, Observation};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Descriptive statistics for one metric over a set of observations
///
/// Derived on demand from the source series, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub metric: Metric,
    pub mean: f64,
    pub min: f64,
    pub min_date: NaiveDate,
    pub max: f64,
    pub max_date: NaiveDate,
    /// Number of observations that contributed a valid value
    pub count: usize,
}

impl SummaryStats {
    /// Spread between the extremes
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Compute summary statistics for a metric over an optional date range
///
/// The range defaults to the full series when omitted. Fails with
/// `EmptyRange` when no in-range observation carries a value for the
/// metric; callers treat that as "insufficient data", not a crash.
pub fn summarize(
    series: &CitySeries,
    metric: Metric,
    range: Option<&DateRange>,
) -> AnalysisResult<SummaryStats> {
    let detail = match range {
        Some(r) => format!("{} in {}", series.city(), r),
        None => format!("{}, full series", series.city()),
    };

    match range {
        Some(r) => summarize_observations(metric, series.in_range(r), &detail),
        None => summarize_observations(metric, series.observations(), &detail),
    }
}

/// Summarize any observation sequence; shared with the seasonal aggregator
pub fn summarize_observations<'a>(
    metric: Metric,
    observations: impl IntoIterator<Item = &'a Observation>,
    detail: &str,
) -> AnalysisResult<SummaryStats> {
    let mut sum = 0.0;
    let mut count = 0usize;
    let mut min: Option<(f64, NaiveDate)> = None;
    let mut max: Option<(f64, NaiveDate)> = None;

    for obs in observations {
        let Some(value) = obs.value(metric) else {
            continue;
        };
        sum += value;
        count += 1;

        // Strict comparisons keep the earliest date on ties
        match min {
            Some((lo, _)) if value >= lo => {}
            _ => min = Some((value, obs.date)),
        }
        match max {
            Some((hi, _)) if value <= hi => {}
            _ => max = Some((value, obs.date)),
        }
    }

    let (Some((min, min_date)), Some((max, max_date))) = (min, max) else {
        return Err(AnalysisError::EmptyRange {
            metric,
            detail: detail.to_string(),
        });
    };

    Ok(SummaryStats {
        metric,
        mean: sum / count as f64,
        min,
        min_date,
        max,
        max_date,
        count,
    })
}
