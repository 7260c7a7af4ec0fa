//! Short-horizon temperature forecasting by trend extrapolation

use chrono::{Days, NaiveDate};
use clima_core::{AnalysisError, AnalysisResult, CitySeries, Metric};
use serde::{Deserialize, Serialize};

/// Forecaster configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// How many of the most recent valid temperature observations feed
    /// the trend fit
    pub trailing_days: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { trailing_days: 14 }
    }
}

/// One projected future day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    /// Trend-stability heuristic in (0, 1]; advisory only, not an error
    /// bound
    pub confidence: f64,
}

/// Project temperature `horizon` days past the last observed date
///
/// Fits an ordinary least-squares line over the trailing window of valid
/// temperature observations. A zero horizon yields an empty forecast; a
/// negative one fails with `InvalidRange`; fewer than 2 valid points in
/// the window fail with `InsufficientHistory` since no trend can be fit.
pub fn forecast(
    series: &CitySeries,
    horizon: i32,
    config: &ForecastConfig,
) -> AnalysisResult<Vec<ForecastPoint>> {
    if horizon < 0 {
        return Err(AnalysisError::InvalidRange(format!(
            "forecast horizon must be non-negative, got {}",
            horizon
        )));
    }
    if horizon == 0 {
        return Ok(Vec::new());
    }

    let points: Vec<(NaiveDate, f64)> = series
        .observations()
        .iter()
        .filter_map(|o| o.value(Metric::Temperature).map(|v| (o.date, v)))
        .collect();
    let window_start = points.len().saturating_sub(config.trailing_days);
    let window = &points[window_start..];

    if window.len() < 2 {
        return Err(AnalysisError::InsufficientHistory {
            have: window.len(),
            need: 2,
        });
    }

    let origin = window[0].0;
    let fit = fit_line(
        window
            .iter()
            .map(|(date, v)| ((*date - origin).num_days() as f64, *v)),
    );

    // Inverse of the residual spread around the fitted line: a noisy
    // window earns a low confidence, and it decays into the horizon.
    let base_confidence = 1.0 / (1.0 + fit.rmse);

    let last_observed = series
        .observations()
        .last()
        .map(|o| o.date)
        .unwrap_or(origin);

    let mut out = Vec::with_capacity(horizon as usize);
    for step in 1..=horizon as u64 {
        let date = last_observed + Days::new(step);
        let x = (date - origin).num_days() as f64;
        out.push(ForecastPoint {
            date,
            predicted: fit.slope * x + fit.intercept,
            confidence: base_confidence * 0.95_f64.powi(step as i32 - 1),
        });
    }

    tracing::debug!(
        city = series.city(),
        slope = fit.slope,
        horizon,
        window = window.len(),
        "temperature forecast computed"
    );
    Ok(out)
}

struct LineFit {
    slope: f64,
    intercept: f64,
    rmse: f64,
}

/// Least-squares line through (x, y) points; caller guarantees >= 2
/// points with distinct x
fn fit_line(points: impl Iterator<Item = (f64, f64)> + Clone) -> LineFit {
    let n = points.clone().count() as f64;
    let mean_x = points.clone().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.clone().map(|(_, y)| y).sum::<f64>() / n;

    let ss_xy: f64 = points
        .clone()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let ss_xx: f64 = points.clone().map(|(x, _)| (x - mean_x).powi(2)).sum();

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;

    let sse: f64 = points
        .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
        .sum();
    LineFit {
        slope,
        intercept,
        rmse: (sse / n).sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clima_core::Observation;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn temp_series(values: &[f64]) -> CitySeries {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Observation {
                temperature: Some(v),
                ..Observation::empty(d(i as u32 + 1))
            })
            .collect();
        CitySeries::new("Novo Mesto", observations).unwrap()
    }

    #[test]
    fn test_perfect_linear_trend_extrapolates_exactly() {
        // 10, 11, 12, ... 19 over ten days: slope 1.0 per day
        let values: Vec<f64> = (0..10).map(|i| 10.0 + i as f64).collect();
        let series = temp_series(&values);

        let forecast = forecast(&series, 3, &ForecastConfig::default()).unwrap();
        assert_eq!(forecast.len(), 3);
        assert_eq!(forecast[0].date, d(11));
        assert!((forecast[0].predicted - 20.0).abs() < 1e-9);
        assert!((forecast[2].predicted - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_horizon_is_empty() {
        let series = temp_series(&[10.0, 11.0, 12.0]);
        let forecast = forecast(&series, 0, &ForecastConfig::default()).unwrap();
        assert!(forecast.is_empty());
    }

    #[test]
    fn test_negative_horizon_is_invalid_range() {
        let series = temp_series(&[10.0, 11.0, 12.0]);
        let result = forecast(&series, -1, &ForecastConfig::default());
        assert!(matches!(result, Err(AnalysisError::InvalidRange(_))));
    }

    #[test]
    fn test_too_little_history_fails() {
        let series = temp_series(&[15.0]);
        let result = forecast(&series, 5, &ForecastConfig::default());
        assert!(matches!(
            result,
            Err(AnalysisError::InsufficientHistory { have: 1, need: 2 })
        ));

        let empty = temp_series(&[]);
        let result = forecast(&empty, 5, &ForecastConfig::default());
        assert!(matches!(
            result,
            Err(AnalysisError::InsufficientHistory { have: 0, need: 2 })
        ));
    }

    #[test]
    fn test_trailing_window_limits_fit() {
        // Old flat stretch followed by a recent rise: only the trailing
        // window should shape the trend
        let mut values = vec![10.0; 20];
        values.extend((1..=5).map(|i| 10.0 + i as f64 * 2.0));
        let series = temp_series(&values);

        let config = ForecastConfig { trailing_days: 5 };
        let forecast = forecast(&series, 1, &config).unwrap();
        assert!(forecast[0].predicted > 20.0);
    }

    #[test]
    fn test_confidence_decays_with_horizon() {
        let series = temp_series(&[10.0, 12.0, 11.0, 13.0, 12.0, 14.0]);
        let forecast = forecast(&series, 5, &ForecastConfig::default()).unwrap();

        for pair in forecast.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        for point in &forecast {
            assert!(point.confidence > 0.0 && point.confidence <= 1.0);
        }
    }

    #[test]
    fn test_noisy_window_earns_lower_confidence_than_clean() {
        let clean = temp_series(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let noisy = temp_series(&[10.0, 18.0, 9.0, 16.0, 8.0]);

        let c = forecast(&clean, 1, &ForecastConfig::default()).unwrap();
        let n = forecast(&noisy, 1, &ForecastConfig::default()).unwrap();
        assert!(c[0].confidence > n[0].confidence);
    }
}
