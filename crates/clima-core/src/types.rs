//! Observations, per-city series, metrics, and date ranges

use crate::AnalysisError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four observed metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    Precipitation,
    WindSpeed,
    Pressure,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Temperature,
        Metric::Precipitation,
        Metric::WindSpeed,
        Metric::Pressure,
    ];

    /// Measurement unit label for display and export
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Precipitation => "mm",
            Metric::WindSpeed => "km/h",
            Metric::Pressure => "hPa",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Precipitation => "precipitation",
            Metric::WindSpeed => "wind_speed",
            Metric::Pressure => "pressure",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" | "temp" => Ok(Metric::Temperature),
            "precipitation" | "rain" => Ok(Metric::Precipitation),
            "wind_speed" | "wind" => Ok(Metric::WindSpeed),
            "pressure" => Ok(Metric::Pressure),
            other => Err(AnalysisError::UnknownMetric(other.to_string())),
        }
    }
}

/// A single daily weather record for one city
///
/// Missing metric values stay `None`; they are excluded from aggregates
/// rather than coerced to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
    pub pressure: Option<f64>,
}

impl Observation {
    /// Record with every metric missing
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            temperature: None,
            precipitation: None,
            wind_speed: None,
            pressure: None,
        }
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Precipitation => self.precipitation,
            Metric::WindSpeed => self.wind_speed,
            Metric::Pressure => self.pressure,
        }
    }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AnalysisError> {
        if start > end {
            return Err(AnalysisError::InvalidRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Intersection of two ranges, or None when they are disjoint
    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start <= end {
            Some(DateRange { start, end })
        } else {
            None
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Series construction error
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    #[error("duplicate observation date: {0}")]
    DuplicateDate(NaiveDate),
}

/// Ordered daily observation history for one city
///
/// Observations are sorted ascending by date with no duplicates, and the
/// series is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySeries {
    city: String,
    observations: Vec<Observation>,
}

impl CitySeries {
    /// Build a series, sorting observations by date
    ///
    /// Fails if two observations share a date; the same calendar day
    /// cannot be recorded twice for one city.
    pub fn new(city: impl Into<String>, mut observations: Vec<Observation>) -> Result<Self, SeriesError> {
        observations.sort_by_key(|o| o.date);
        for pair in observations.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(SeriesError::DuplicateDate(pair[0].date));
            }
        }
        Ok(Self {
            city: city.into(),
            observations,
        })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Span of observed dates, None for an empty series
    pub fn date_range(&self) -> Option<DateRange> {
        let first = self.observations.first()?.date;
        let last = self.observations.last()?.date;
        Some(DateRange {
            start: first,
            end: last,
        })
    }

    /// Observations falling inside the given range, in date order
    pub fn in_range<'a>(&'a self, range: &'a DateRange) -> impl Iterator<Item = &'a Observation> {
        self.observations
            .iter()
            .skip_while(move |o| o.date < range.start)
            .take_while(move |o| o.date <= range.end)
    }

    /// Valid (non-missing) values for a metric over the whole series
    pub fn values(&self, metric: Metric) -> impl Iterator<Item = f64> + '_ {
        self.observations.iter().filter_map(move |o| o.value(metric))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn obs(date: NaiveDate, temp: f64) -> Observation {
        Observation {
            temperature: Some(temp),
            ..Observation::empty(date)
        }
    }

    #[test]
    fn test_series_sorts_by_date() {
        let series = CitySeries::new(
            "Ljubljana",
            vec![obs(d(2024, 1, 3), 3.0), obs(d(2024, 1, 1), 1.0), obs(d(2024, 1, 2), 2.0)],
        )
        .unwrap();

        let dates: Vec<_> = series.observations().iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
    }

    #[test]
    fn test_series_rejects_duplicate_dates() {
        let result = CitySeries::new(
            "Maribor",
            vec![obs(d(2024, 1, 1), 1.0), obs(d(2024, 1, 1), 2.0)],
        );
        assert!(matches!(result, Err(SeriesError::DuplicateDate(_))));
    }

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        let result = DateRange::new(d(2024, 2, 1), d(2024, 1, 1));
        assert!(matches!(result, Err(AnalysisError::InvalidRange(_))));
    }

    #[test]
    fn test_date_range_intersection() {
        let a = DateRange::new(d(2024, 1, 1), d(2024, 1, 10)).unwrap();
        let b = DateRange::new(d(2024, 1, 5), d(2024, 1, 20)).unwrap();

        let overlap = a.intersect(&b).unwrap();
        assert_eq!(overlap.start(), d(2024, 1, 5));
        assert_eq!(overlap.end(), d(2024, 1, 10));

        let c = DateRange::new(d(2024, 2, 1), d(2024, 2, 5)).unwrap();
        assert!(a.intersect(&c).is_none());
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("temperature".parse::<Metric>().unwrap(), Metric::Temperature);
        assert_eq!("rain".parse::<Metric>().unwrap(), Metric::Precipitation);
        assert_eq!("wind".parse::<Metric>().unwrap(), Metric::WindSpeed);
        assert!(matches!(
            "humidity".parse::<Metric>(),
            Err(AnalysisError::UnknownMetric(_))
        ));
    }

    #[test]
    fn test_missing_values_stay_missing() {
        let o = Observation::empty(d(2024, 1, 1));
        for metric in Metric::ALL {
            assert_eq!(o.value(metric), None);
        }
    }

    #[test]
    fn test_in_range_filters_dates() {
        let series = CitySeries::new(
            "Koper",
            (1..=10).map(|day| obs(d(2024, 1, day), day as f64)).collect(),
        )
        .unwrap();

        let range = DateRange::new(d(2024, 1, 4), d(2024, 1, 6)).unwrap();
        let picked: Vec<_> = series.in_range(&range).map(|o| o.date.day()).collect();
        assert_eq!(picked, vec![4, 5, 6]);
    }
}
