//! Record days and multi-day extreme spells

use chrono::NaiveDate;
use clima_core::{summarize, AnalysisResult, CitySeries, Metric};
use serde::{Deserialize, Serialize};

/// Kind of extreme event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremeKind {
    RecordHigh,
    RecordLow,
    Spell,
}

/// A single-day record or a multi-day spell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeEvent {
    pub metric: Metric,
    pub kind: ExtremeKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub peak: f64,
}

/// Which tail of the distribution a spell lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellSide {
    /// Values strictly above the percentile (heatwave-style)
    Above,
    /// Values strictly below the percentile (cold-spell-style)
    Below,
}

/// Spell detection configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpellConfig {
    /// Percentile of the city's own historical distribution
    pub percentile: f64,
    /// Shortest run worth reporting, in consecutive days
    pub min_run: usize,
    pub side: SpellSide,
}

impl Default for SpellConfig {
    fn default() -> Self {
        Self {
            percentile: 90.0,
            min_run: 2,
            side: SpellSide::Above,
        }
    }
}

/// Absolute single-day records over the full series
///
/// Returns (record high, record low); ties resolve to the earliest date.
pub fn records(series: &CitySeries, metric: Metric) -> AnalysisResult<(ExtremeEvent, ExtremeEvent)> {
    let stats = summarize(series, metric, None)?;

    let high = ExtremeEvent {
        metric,
        kind: ExtremeKind::RecordHigh,
        start: stats.max_date,
        end: stats.max_date,
        peak: stats.max,
    };
    let low = ExtremeEvent {
        metric,
        kind: ExtremeKind::RecordLow,
        start: stats.min_date,
        end: stats.min_date,
        peak: stats.min,
    };
    Ok((high, low))
}

/// Maximal runs of calendar-consecutive days beyond a percentile
///
/// The percentile value is computed over the full series at call time, so
/// results are deterministic for a fixed series. A gap in observed dates
/// breaks a run, as does a missing value. Runs shorter than
/// `config.min_run` are dropped; reported spells never overlap.
pub fn spells(
    series: &CitySeries,
    metric: Metric,
    config: &SpellConfig,
) -> AnalysisResult<Vec<ExtremeEvent>> {
    let mut values: Vec<f64> = series.values(metric).collect();
    if values.is_empty() {
        return Err(clima_core::AnalysisError::EmptyRange {
            metric,
            detail: format!("{}, full series", series.city()),
        });
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let threshold = nearest_rank(&values, config.percentile);

    let beyond = |v: f64| match config.side {
        SpellSide::Above => v > threshold,
        SpellSide::Below => v < threshold,
    };

    let mut events = Vec::new();
    let mut run: Option<(NaiveDate, NaiveDate, f64)> = None;

    for obs in series.observations() {
        let value = obs.value(metric).filter(|&v| beyond(v));
        match (run, value) {
            // Consecutive calendar day continuing the run
            (Some((start, end, peak)), Some(v)) if (obs.date - end).num_days() == 1 => {
                let peak = match config.side {
                    SpellSide::Above => peak.max(v),
                    SpellSide::Below => peak.min(v),
                };
                run = Some((start, obs.date, peak));
            }
            // Qualifying day after a gap or a non-qualifying stretch
            (prev, Some(v)) => {
                flush_run(&mut events, prev, metric, config.min_run);
                run = Some((obs.date, obs.date, v));
            }
            // Non-qualifying or missing value ends any open run
            (prev, None) => {
                flush_run(&mut events, prev, metric, config.min_run);
                run = None;
            }
        }
    }
    flush_run(&mut events, run, metric, config.min_run);

    tracing::debug!(
        city = series.city(),
        %metric,
        threshold,
        spells = events.len(),
        "spell detection complete"
    );
    Ok(events)
}

fn flush_run(
    events: &mut Vec<ExtremeEvent>,
    run: Option<(NaiveDate, NaiveDate, f64)>,
    metric: Metric,
    min_run: usize,
) {
    let Some((start, end, peak)) = run else {
        return;
    };
    let days = (end - start).num_days() as usize + 1;
    if days >= min_run {
        events.push(ExtremeEvent {
            metric,
            kind: ExtremeKind::Spell,
            start,
            end,
            peak,
        });
    }
}

/// Nearest-rank percentile over sorted values
fn nearest_rank(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    let rank = ((percentile / 100.0) * n as f64).ceil() as usize;
    sorted[rank.clamp(1, n) - 1]
}
