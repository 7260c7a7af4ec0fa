//! Rolling-baseline anomaly detection

use chrono::NaiveDate;
use clima_core::{CitySeries, Metric};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Deviation threshold for flagging an observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// Absolute deviation from the baseline, in the metric's own unit
    Absolute(f64),
    /// Multiple of the baseline window's sample standard deviation
    StdDevs(f64),
}

/// Detector configuration
///
/// Window and threshold are required inputs with no implicit defaults;
/// what counts as "anomalous" is domain-relative and belongs to the
/// caller's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// Trailing baseline window size, in observed values
    pub window: usize,
    pub threshold: Threshold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Above,
    Below,
}

/// One flagged observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub date: NaiveDate,
    pub metric: Metric,
    pub observed: f64,
    pub baseline: f64,
    pub deviation: f64,
    pub direction: Direction,
}

/// Flag observations deviating from their trailing baseline
///
/// The baseline is the mean of the last `window` non-anomalous valid
/// values before the observation; flagged values are skipped so a single
/// spike does not drag the baselines that follow it. Nothing is flagged
/// until a full window of clean values exists (cold start), and missing
/// values neither get flagged nor enter the baseline.
///
/// The returned iterator is lazy, ordered by date ascending, finite, and
/// cheap to recompute: the source series is immutable, so running the
/// detector twice yields identical results.
pub fn detect<'a>(
    series: &'a CitySeries,
    metric: Metric,
    config: AnomalyConfig,
) -> impl Iterator<Item = Anomaly> + 'a {
    Detector {
        observations: series.observations().iter(),
        metric,
        config,
        baseline: VecDeque::with_capacity(config.window),
    }
}

struct Detector<'a> {
    observations: std::slice::Iter<'a, clima_core::Observation>,
    metric: Metric,
    config: AnomalyConfig,
    baseline: VecDeque<f64>,
}

impl Detector<'_> {
    fn push_clean(&mut self, value: f64) {
        if self.config.window == 0 {
            return;
        }
        if self.baseline.len() == self.config.window {
            self.baseline.pop_front();
        }
        self.baseline.push_back(value);
    }

    fn threshold_value(&self) -> Option<f64> {
        match self.config.threshold {
            Threshold::Absolute(t) => Some(t),
            Threshold::StdDevs(k) => {
                let std = sample_std(self.baseline.iter().copied())?;
                Some(k * std)
            }
        }
    }
}

impl Iterator for Detector<'_> {
    type Item = Anomaly;

    fn next(&mut self) -> Option<Anomaly> {
        loop {
            let obs = self.observations.next()?;
            let Some(observed) = obs.value(self.metric) else {
                continue;
            };

            // Cold start: no judgment without a full baseline
            if self.config.window == 0 || self.baseline.len() < self.config.window {
                self.push_clean(observed);
                continue;
            }

            let baseline = self.baseline.iter().sum::<f64>() / self.baseline.len() as f64;
            let deviation = (observed - baseline).abs();
            let flagged = match self.threshold_value() {
                Some(t) => deviation > t,
                // Degenerate window (e.g. zero spread in sigma mode): cannot judge
                None => false,
            };

            if flagged {
                return Some(Anomaly {
                    date: obs.date,
                    metric: self.metric,
                    observed,
                    baseline,
                    deviation,
                    direction: if observed > baseline {
                        Direction::Above
                    } else {
                        Direction::Below
                    },
                });
            }
            self.push_clean(observed);
        }
    }
}

/// Sample standard deviation; None for fewer than 2 values or zero spread
fn sample_std(values: impl Iterator<Item = f64> + Clone) -> Option<f64> {
    let n = values.clone().count();
    if n < 2 {
        return None;
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    let var = values.map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = var.sqrt();
    if std > 0.0 {
        Some(std)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clima_core::Observation;

    fn temp_series(values: &[f64]) -> CitySeries {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Observation {
                temperature: Some(v),
                ..Observation::empty(
                    NaiveDate::from_ymd_opt(2024, 1, i as u32 + 1).unwrap(),
                )
            })
            .collect();
        CitySeries::new("Murska Sobota", observations).unwrap()
    }

    #[test]
    fn test_single_spike_flagged() {
        // Worked example: window 3, absolute threshold 5°C, only the
        // 30°C spike on day 4 may be flagged.
        let series = temp_series(&[10.0, 12.0, 11.0, 30.0, 13.0, 12.0, 11.0, 10.0, 9.0, 12.0]);
        let config = AnomalyConfig {
            window: 3,
            threshold: Threshold::Absolute(5.0),
        };

        let anomalies: Vec<_> = detect(&series, Metric::Temperature, config).collect();
        assert_eq!(anomalies.len(), 1);

        let a = &anomalies[0];
        assert_eq!(a.date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(a.observed, 30.0);
        assert_eq!(a.baseline, 11.0);
        assert_eq!(a.deviation, 19.0);
        assert_eq!(a.direction, Direction::Above);
    }

    #[test]
    fn test_cold_start_never_flags_first_window() {
        // A wild first value cannot be judged: there is no baseline yet
        let series = temp_series(&[100.0, 10.0, 11.0, 12.0]);
        let config = AnomalyConfig {
            window: 3,
            threshold: Threshold::Absolute(5.0),
        };

        let flagged_dates: Vec<_> = detect(&series, Metric::Temperature, config)
            .map(|a| a.date)
            .collect();
        assert!(!flagged_dates.contains(&NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
    }

    #[test]
    fn test_detection_is_idempotent() {
        let series = temp_series(&[10.0, 12.0, 11.0, 30.0, 13.0, 2.0, 11.0, 10.0]);
        let config = AnomalyConfig {
            window: 3,
            threshold: Threshold::Absolute(5.0),
        };

        let first: Vec<_> = detect(&series, Metric::Temperature, config).collect();
        let second: Vec<_> = detect(&series, Metric::Temperature, config).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_results_ordered_by_date() {
        let series = temp_series(&[10.0, 11.0, 10.0, 40.0, 10.0, -20.0, 11.0]);
        let config = AnomalyConfig {
            window: 3,
            threshold: Threshold::Absolute(5.0),
        };

        let dates: Vec<_> = detect(&series, Metric::Temperature, config)
            .map(|a| a.date)
            .collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_sigma_threshold() {
        // Steady values with spread 1.0, then a jump far beyond 2 sigma
        let series = temp_series(&[10.0, 11.0, 12.0, 11.0, 25.0]);
        let config = AnomalyConfig {
            window: 4,
            threshold: Threshold::StdDevs(2.0),
        };

        let anomalies: Vec<_> = detect(&series, Metric::Temperature, config).collect();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].observed, 25.0);
    }

    #[test]
    fn test_flat_baseline_in_sigma_mode_flags_nothing() {
        // Zero spread means sigma-based judgment is undefined
        let series = temp_series(&[10.0, 10.0, 10.0, 30.0]);
        let config = AnomalyConfig {
            window: 3,
            threshold: Threshold::StdDevs(2.0),
        };

        assert_eq!(detect(&series, Metric::Temperature, config).count(), 0);
    }

    #[test]
    fn test_missing_values_skipped() {
        let mut observations: Vec<Observation> = (1..=5)
            .map(|d| Observation {
                temperature: Some(10.0 + d as f64 * 0.1),
                ..Observation::empty(NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            })
            .collect();
        observations.push(Observation::empty(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()));
        let series = CitySeries::new("Koper", observations).unwrap();

        let config = AnomalyConfig {
            window: 3,
            threshold: Threshold::Absolute(1.0),
        };
        assert_eq!(detect(&series, Metric::Temperature, config).count(), 0);
    }
}
