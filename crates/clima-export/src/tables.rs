//! Tabular implementations for every analysis result type

use crate::Tabular;
use clima_analysis::{
    Anomaly, ComparisonResult, CorrelationMatrix, Direction, ExtremeEvent, ExtremeKind,
    ForecastPoint,
};
use clima_core::{SeasonalReport, SummaryStats};

fn num(value: f64) -> String {
    format!("{:.2}", value)
}

impl Tabular for SummaryStats {
    fn header(&self) -> Vec<&'static str> {
        vec!["metric", "mean", "min", "min_date", "max", "max_date", "count"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.metric.to_string(),
            num(self.mean),
            num(self.min),
            self.min_date.to_string(),
            num(self.max),
            self.max_date.to_string(),
            self.count.to_string(),
        ]]
    }
}

impl Tabular for [Anomaly] {
    fn header(&self) -> Vec<&'static str> {
        vec!["date", "metric", "observed", "baseline", "deviation", "direction"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|a| {
                vec![
                    a.date.to_string(),
                    a.metric.to_string(),
                    num(a.observed),
                    num(a.baseline),
                    num(a.deviation),
                    match a.direction {
                        Direction::Above => "above".to_string(),
                        Direction::Below => "below".to_string(),
                    },
                ]
            })
            .collect()
    }
}

impl Tabular for [ExtremeEvent] {
    fn header(&self) -> Vec<&'static str> {
        vec!["metric", "kind", "start", "end", "peak"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|e| {
                let kind = match e.kind {
                    ExtremeKind::RecordHigh => "record_high",
                    ExtremeKind::RecordLow => "record_low",
                    ExtremeKind::Spell => "spell",
                };
                vec![
                    e.metric.to_string(),
                    kind.to_string(),
                    e.start.to_string(),
                    e.end.to_string(),
                    num(e.peak),
                ]
            })
            .collect()
    }
}

impl Tabular for SeasonalReport {
    fn header(&self) -> Vec<&'static str> {
        vec!["season", "metric", "mean", "min", "max", "count"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.seasons
            .iter()
            .map(|(season, stats)| match stats {
                Some(s) => vec![
                    season.to_string(),
                    self.metric.to_string(),
                    num(s.mean),
                    num(s.min),
                    num(s.max),
                    s.count.to_string(),
                ],
                // No data: visibly empty fields, never synthetic zeros
                None => vec![
                    season.to_string(),
                    self.metric.to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    "0".to_string(),
                ],
            })
            .collect()
    }
}

impl Tabular for [ForecastPoint] {
    fn header(&self) -> Vec<&'static str> {
        vec!["date", "predicted", "confidence"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|p| {
                vec![
                    p.date.to_string(),
                    num(p.predicted),
                    format!("{:.3}", p.confidence),
                ]
            })
            .collect()
    }
}

impl Tabular for ComparisonResult {
    fn header(&self) -> Vec<&'static str> {
        vec!["rank", "city", "metric", "mean", "min", "max", "count"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.ranking
            .iter()
            .enumerate()
            .map(|(i, city)| {
                let s = &self.cities[city];
                vec![
                    (i + 1).to_string(),
                    city.clone(),
                    s.metric.to_string(),
                    num(s.mean),
                    num(s.min),
                    num(s.max),
                    s.count.to_string(),
                ]
            })
            .collect()
    }
}

impl Tabular for CorrelationMatrix {
    fn header(&self) -> Vec<&'static str> {
        vec!["metric", "temperature", "precipitation", "wind_speed", "pressure"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.metrics
            .iter()
            .zip(&self.coefficients)
            .map(|(metric, row)| {
                let mut cells = vec![metric.to_string()];
                cells.extend(row.iter().map(|c| match c {
                    Some(r) => format!("{:.3}", r),
                    None => String::new(),
                }));
                cells
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clima_core::{CitySeries, Metric, Observation, SeasonMap};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn series() -> CitySeries {
        let observations = (1..=10)
            .map(|day| Observation {
                temperature: Some(15.0 + day as f64),
                precipitation: Some(day as f64 * 0.5),
                wind_speed: Some(10.0),
                pressure: Some(1013.0),
                date: d(day),
            })
            .collect();
        CitySeries::new("Ljubljana", observations).unwrap()
    }

    #[test]
    fn test_summary_stats_single_row() {
        let stats = clima_core::summarize(&series(), Metric::Temperature, None).unwrap();
        assert_eq!(stats.header().len(), stats.rows()[0].len());
        assert_eq!(stats.rows().len(), 1);
        assert_eq!(stats.rows()[0][0], "temperature");
    }

    #[test]
    fn test_seasonal_no_data_rows_are_blank() {
        let report = clima_core::seasonal_report(&series(), Metric::Temperature, &SeasonMap::default());
        let rows = report.rows();
        assert_eq!(rows.len(), 4);

        // June data only: Summer has values, Winter is blank with count 0
        let winter = rows.iter().find(|r| r[0] == "Winter").unwrap();
        assert_eq!(winter[2], "");
        assert_eq!(winter[5], "0");
        let summer = rows.iter().find(|r| r[0] == "Summer").unwrap();
        assert_ne!(summer[2], "");
    }

    #[test]
    fn test_comparison_rows_follow_ranking() {
        let a = series();
        let observations = (1..=10)
            .map(|day| Observation {
                temperature: Some(30.0),
                ..Observation::empty(d(day))
            })
            .collect();
        let b = CitySeries::new("Maribor", observations).unwrap();

        let result = clima_analysis::compare(
            &[a, b],
            Metric::Temperature,
            None,
            clima_analysis::RankBy::Mean,
        )
        .unwrap();
        let rows = result.rows();
        assert_eq!(rows[0][1], "Maribor");
        assert_eq!(rows[0][0], "1");
    }

    #[test]
    fn test_every_row_matches_header_width() {
        let s = series();
        let stats = clima_core::summarize(&s, Metric::Temperature, None).unwrap();
        let report = clima_core::seasonal_report(&s, Metric::Temperature, &SeasonMap::default());
        let matrix = clima_analysis::correlation_matrix(&s);

        check_widths(&stats);
        check_widths(&report);
        check_widths(&matrix);
    }

    fn check_widths<T: Tabular + ?Sized>(table: &T) {
        let width = table.header().len();
        for row in table.rows() {
            assert_eq!(row.len(), width);
        }
    }
}
