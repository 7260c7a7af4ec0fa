//! Cross-city comparison over a common date range

use clima_core::{
    summarize, AnalysisError, AnalysisResult, CitySeries, DateRange, Metric, SummaryStats,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistic used to order cities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    Mean,
    Max,
}

/// Per-city statistics and a ranking for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub metric: Metric,
    pub rank_by: RankBy,
    /// The common range the statistics were computed over
    pub range: DateRange,
    pub cities: BTreeMap<String, SummaryStats>,
    /// City names, best first, ties broken by name
    pub ranking: Vec<String>,
}

/// Compare cities over the intersection of their date coverage
///
/// The range defaults to the intersection of every non-empty series'
/// available dates; `NoOverlap` when that intersection is empty. A city
/// with only partial data inside the range still participates with the
/// observations it has; a city with no valid value at all for the metric
/// is left out of the result.
pub fn compare(
    series_set: &[CitySeries],
    metric: Metric,
    range: Option<DateRange>,
    rank_by: RankBy,
) -> AnalysisResult<ComparisonResult> {
    let range = match range {
        Some(r) => r,
        None => common_range(series_set)?,
    };

    let mut cities = BTreeMap::new();
    for series in series_set {
        match summarize(series, metric, Some(&range)) {
            Ok(stats) => {
                cities.insert(series.city().to_string(), stats);
            }
            Err(AnalysisError::EmptyRange { .. }) => {
                tracing::debug!(
                    city = series.city(),
                    %metric,
                    %range,
                    "city has no valid data in comparison range, skipping"
                );
            }
            Err(e) => return Err(e),
        }
    }
    if cities.is_empty() {
        return Err(AnalysisError::NoOverlap);
    }

    let mut ranking: Vec<String> = cities.keys().cloned().collect();
    ranking.sort_by(|a, b| {
        let key = |city: &String| match rank_by {
            RankBy::Mean => cities[city].mean,
            RankBy::Max => cities[city].max,
        };
        key(b).total_cmp(&key(a)).then_with(|| a.cmp(b))
    });

    Ok(ComparisonResult {
        metric,
        rank_by,
        range,
        cities,
        ranking,
    })
}

/// Intersection of the available date ranges of all non-empty series
fn common_range(series_set: &[CitySeries]) -> AnalysisResult<DateRange> {
    let mut common: Option<DateRange> = None;
    for series in series_set {
        let Some(range) = series.date_range() else {
            continue;
        };
        common = Some(match common {
            None => range,
            Some(prev) => prev.intersect(&range).ok_or(AnalysisError::NoOverlap)?,
        });
    }
    common.ok_or(AnalysisError::NoOverlap)
}
