//! Seasonal bucketing of observations

use crate::{summarize_observations, CitySeries, Metric, SummaryStats};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Calendar season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Autumn];
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        };
        f.pad(name)
    }
}

/// Month-to-season assignment
///
/// Season boundaries are configuration, not constants; the default is the
/// Northern-hemisphere convention used by the source region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonMap {
    /// Season for each month, January first
    months: [Season; 12],
}

impl SeasonMap {
    pub fn new(months: [Season; 12]) -> Self {
        Self { months }
    }

    /// Dec-Feb Winter, Mar-May Spring, Jun-Aug Summer, Sep-Nov Autumn
    pub fn northern() -> Self {
        use Season::*;
        Self {
            months: [
                Winter, Winter, Spring, Spring, Spring, Summer, Summer, Summer, Autumn, Autumn,
                Autumn, Winter,
            ],
        }
    }

    /// Season for a 1-based calendar month
    pub fn season_for(&self, month: u32) -> Season {
        self.months[(month as usize - 1) % 12]
    }
}

impl Default for SeasonMap {
    fn default() -> Self {
        Self::northern()
    }
}

/// Per-season summary statistics for one metric
///
/// A season with no valid observations is `None`, distinguishable
/// downstream from a season that merely averaged to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalReport {
    pub metric: Metric,
    pub seasons: BTreeMap<Season, Option<SummaryStats>>,
}

impl SeasonalReport {
    /// Total valid observations across the four buckets
    pub fn total_count(&self) -> usize {
        self.seasons
            .values()
            .filter_map(|s| s.as_ref().map(|s| s.count))
            .sum()
    }
}

/// Bucket a series into the four seasons and summarize each bucket
///
/// Every observation lands in exactly one bucket, so bucket counts
/// partition the series' valid-observation count for the metric.
pub fn seasonal_report(series: &CitySeries, metric: Metric, map: &SeasonMap) -> SeasonalReport {
    let mut buckets: BTreeMap<Season, Vec<&crate::Observation>> = BTreeMap::new();
    for season in Season::ALL {
        buckets.insert(season, Vec::new());
    }
    for obs in series.observations() {
        let season = map.season_for(obs.date.month());
        buckets.entry(season).or_default().push(obs);
    }

    let mut seasons = BTreeMap::new();
    for (season, observations) in buckets {
        let detail = format!("{}, {}", series.city(), season);
        let stats = summarize_observations(metric, observations.iter().copied(), &detail).ok();
        seasons.insert(season, stats);
    }

    SeasonalReport { metric, seasons }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Observation;
    use chrono::NaiveDate;

    fn obs(y: i32, m: u32, d: u32, temp: f64) -> Observation {
        Observation {
            temperature: Some(temp),
            ..Observation::empty(NaiveDate::from_ymd_opt(y, m, d).unwrap())
        }
    }

    #[test]
    fn test_northern_month_assignment() {
        let map = SeasonMap::default();
        assert_eq!(map.season_for(1), Season::Winter);
        assert_eq!(map.season_for(4), Season::Spring);
        assert_eq!(map.season_for(7), Season::Summer);
        assert_eq!(map.season_for(10), Season::Autumn);
        assert_eq!(map.season_for(12), Season::Winter);
    }

    #[test]
    fn test_buckets_partition_valid_count() {
        let series = CitySeries::new(
            "Ptuj",
            vec![
                obs(2024, 1, 10, -2.0),
                obs(2024, 4, 10, 12.0),
                obs(2024, 7, 10, 28.0),
                obs(2024, 10, 10, 11.0),
                obs(2024, 12, 10, 0.5),
            ],
        )
        .unwrap();

        let report = seasonal_report(&series, Metric::Temperature, &SeasonMap::default());
        let full = crate::summarize(&series, Metric::Temperature, None).unwrap();
        assert_eq!(report.total_count(), full.count);
    }

    #[test]
    fn test_empty_season_is_explicit_no_data() {
        // Summer-only data: the other three buckets must be None, not NaN stats
        let series = CitySeries::new(
            "Velenje",
            vec![obs(2024, 6, 1, 20.0), obs(2024, 7, 1, 25.0)],
        )
        .unwrap();

        let report = seasonal_report(&series, Metric::Temperature, &SeasonMap::default());
        assert!(report.seasons[&Season::Summer].is_some());
        assert!(report.seasons[&Season::Winter].is_none());
        assert!(report.seasons[&Season::Spring].is_none());
        assert!(report.seasons[&Season::Autumn].is_none());
    }

    #[test]
    fn test_all_four_buckets_always_present() {
        let series = CitySeries::new("Trbovlje", vec![]).unwrap();
        let report = seasonal_report(&series, Metric::Temperature, &SeasonMap::default());
        assert_eq!(report.seasons.len(), 4);
        assert!(report.seasons.values().all(|s| s.is_none()));
    }
}
