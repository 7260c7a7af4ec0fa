//! Console orchestration: load series, run every analysis, render text
//!
//! The report builders are plain functions over immutable series so the
//! console output stays testable without touching the filesystem. Core
//! error kinds surface as specific one-line messages, never stack traces.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clima_analysis::{
    compare, correlation_matrix, detect, forecast, records, spells, AnomalyConfig, ForecastConfig,
    RankBy, SpellConfig, SpellSide, Threshold,
};
use clima_config::AnalysisSettings;
use clima_core::{seasonal_report, summarize, CitySeries, DateRange, Metric};
use clima_export::CsvSink;
use clima_fetch::ObservationSource;

/// Fetch every configured city concurrently and build its series
///
/// Cities whose source is unavailable or empty are logged and skipped;
/// the run only fails when no city yields any observations at all.
pub async fn load_series(
    source: Arc<dyn ObservationSource>,
    cities: &[String],
    range: DateRange,
) -> Result<Vec<CitySeries>> {
    let mut handles = Vec::with_capacity(cities.len());
    for city in cities {
        let source = Arc::clone(&source);
        let city = city.clone();
        handles.push((
            city.clone(),
            tokio::spawn(async move { source.fetch_daily(&city, &range).await }),
        ));
    }

    let mut all = Vec::new();
    for (city, handle) in handles {
        match handle.await.context("fetch task panicked")? {
            Ok(observations) if observations.is_empty() => {
                tracing::warn!(%city, %range, "no data for city in range");
            }
            Ok(observations) => {
                let series = CitySeries::new(&city, observations)
                    .with_context(|| format!("bad observation data for {}", city))?;
                tracing::info!(%city, days = series.len(), "series loaded");
                all.push(series);
            }
            Err(e) => {
                tracing::warn!(%city, error = %e, "source unavailable, skipping city");
            }
        }
    }

    if all.is_empty() {
        bail!("no city produced any observations");
    }
    Ok(all)
}

/// Full per-city analysis as console text
pub fn city_report(series: &CitySeries, settings: &AnalysisSettings) -> String {
    let mut out = String::new();
    let span = series
        .date_range()
        .map(|r| r.to_string())
        .unwrap_or_else(|| "no observations".to_string());
    let _ = writeln!(out, "--- Analysis for {} ({}) ---", series.city(), span);

    for metric in Metric::ALL {
        match summarize(series, metric, None) {
            Ok(stats) => {
                let _ = writeln!(
                    out,
                    "  {:<13} avg {:>7.2} {}, min {:.2} ({}), max {:.2} ({})",
                    metric,
                    stats.mean,
                    metric.unit(),
                    stats.min,
                    stats.min_date,
                    stats.max,
                    stats.max_date,
                );
            }
            Err(e) => {
                let _ = writeln!(out, "  {:<13} {}", metric, e);
            }
        }
    }

    let _ = writeln!(out, "\nExtremes:");
    for metric in Metric::ALL {
        match records(series, metric) {
            Ok((high, low)) => {
                let _ = writeln!(
                    out,
                    "  {:<13} high {:.2} {} on {}, low {:.2} {} on {}",
                    metric,
                    high.peak,
                    metric.unit(),
                    high.start,
                    low.peak,
                    metric.unit(),
                    low.start,
                );
            }
            Err(e) => {
                let _ = writeln!(out, "  {:<13} {}", metric, e);
            }
        }
    }

    let spell_config = SpellConfig {
        percentile: settings.spell_percentile,
        min_run: settings.spell_min_run,
        side: SpellSide::Above,
    };
    match spells(series, Metric::Temperature, &spell_config) {
        Ok(runs) if runs.is_empty() => {
            let _ = writeln!(out, "\nNo heat spells found.");
        }
        Ok(runs) => {
            let _ = writeln!(out, "\nHeat spells (>{}th percentile):", settings.spell_percentile);
            for spell in runs {
                let _ = writeln!(
                    out,
                    "  {} to {}: peak {:.2} °C",
                    spell.start, spell.end, spell.peak
                );
            }
        }
        Err(e) => {
            let _ = writeln!(out, "\nHeat spells: {}", e);
        }
    }

    let anomaly_config = AnomalyConfig {
        window: settings.anomaly_window,
        threshold: Threshold::StdDevs(settings.anomaly_threshold),
    };
    let _ = writeln!(
        out,
        "\nAnomalies (window={}, threshold={} sigma):",
        settings.anomaly_window, settings.anomaly_threshold
    );
    let mut found = false;
    for metric in [Metric::Temperature, Metric::Precipitation] {
        for anomaly in detect(series, metric, anomaly_config) {
            found = true;
            let _ = writeln!(
                out,
                "  {} {}: {:.2} vs baseline {:.2} ({:+.2})",
                anomaly.date,
                metric,
                anomaly.observed,
                anomaly.baseline,
                anomaly.observed - anomaly.baseline,
            );
        }
    }
    if !found {
        let _ = writeln!(out, "  none found");
    }

    let _ = writeln!(out, "\nSeasonal temperature:");
    let seasonal = seasonal_report(series, Metric::Temperature, &settings.season_map);
    for (season, stats) in &seasonal.seasons {
        match stats {
            Some(s) => {
                let _ = writeln!(out, "  {:<7} avg {:.2} °C over {} days", season, s.mean, s.count);
            }
            None => {
                let _ = writeln!(out, "  {:<7} no data", season);
            }
        }
    }

    let forecast_config = ForecastConfig {
        trailing_days: settings.forecast_trailing_days,
    };
    match forecast(series, settings.forecast_horizon, &forecast_config) {
        Ok(points) => {
            let _ = writeln!(out, "\nTemperature forecast ({} days):", settings.forecast_horizon);
            for point in points {
                let _ = writeln!(
                    out,
                    "  {}: {:.2} °C (confidence {:.2})",
                    point.date, point.predicted, point.confidence
                );
            }
        }
        Err(e) => {
            let _ = writeln!(out, "\nTemperature forecast: {}", e);
        }
    }

    out
}

/// Cross-city comparison as console text
pub fn comparison_report(all: &[CitySeries]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- City Comparison ---");

    let sections: [(&str, Metric, RankBy); 4] = [
        ("Average temperature (°C)", Metric::Temperature, RankBy::Mean),
        ("Highest daily precipitation (mm)", Metric::Precipitation, RankBy::Max),
        ("Average wind speed (km/h)", Metric::WindSpeed, RankBy::Mean),
        ("Average air pressure (hPa)", Metric::Pressure, RankBy::Mean),
    ];

    for (title, metric, rank_by) in sections {
        let _ = writeln!(out, "\n{}:", title);
        match compare(all, metric, None, rank_by) {
            Ok(result) => {
                for city in &result.ranking {
                    let stats = &result.cities[city];
                    let value = match rank_by {
                        RankBy::Mean => stats.mean,
                        RankBy::Max => stats.max,
                    };
                    let _ = writeln!(out, "  {:<14} {:>8.2}", city, value);
                }
                let _ = writeln!(out, "  (period: {})", result.range);
            }
            Err(e) => {
                let _ = writeln!(out, "  {}", e);
            }
        }
    }

    out
}

/// Export per-city and comparison tables to CSV
pub fn export_tables(
    dir: &str,
    all: &[CitySeries],
    settings: &AnalysisSettings,
) -> Result<Vec<std::path::PathBuf>> {
    let sink = CsvSink::new(dir)?;
    let mut written = Vec::new();

    for series in all {
        let stem = series.city().to_lowercase().replace(' ', "_");

        match summarize(series, Metric::Temperature, None) {
            Ok(stats) => {
                written.push(sink.write(&format!("{}_temperature_summary", stem), &stats)?);
            }
            Err(e) => {
                tracing::debug!(city = series.city(), error = %e, "temperature summary not exported");
            }
        }

        let anomaly_config = AnomalyConfig {
            window: settings.anomaly_window,
            threshold: Threshold::StdDevs(settings.anomaly_threshold),
        };
        let anomalies: Vec<_> = detect(series, Metric::Temperature, anomaly_config).collect();
        written.push(sink.write(&format!("{}_anomalies", stem), anomalies.as_slice())?);

        let seasonal = seasonal_report(series, Metric::Temperature, &settings.season_map);
        written.push(sink.write(&format!("{}_seasonal", stem), &seasonal)?);

        let forecast_config = ForecastConfig {
            trailing_days: settings.forecast_trailing_days,
        };
        match forecast(series, settings.forecast_horizon, &forecast_config) {
            Ok(points) => {
                written.push(sink.write(&format!("{}_forecast", stem), points.as_slice())?);
            }
            Err(e) => {
                tracing::debug!(city = series.city(), error = %e, "forecast not exported");
            }
        }

        written.push(sink.write(
            &format!("{}_correlation", stem),
            &correlation_matrix(series),
        )?);
    }

    match compare(all, Metric::Temperature, None, RankBy::Mean) {
        Ok(result) => {
            written.push(sink.write("comparison_temperature", &result)?);
        }
        Err(e) => {
            tracing::debug!(error = %e, "comparison table not exported");
        }
    }

    tracing::info!(tables = written.len(), dir, "CSV export complete");
    Ok(written)
}
