//! Pairwise correlation of weather metrics

use clima_core::{CitySeries, Metric};
use serde::{Deserialize, Serialize};

/// Pearson correlation coefficients for every metric pair
///
/// Coefficients are computed over pairwise-complete observations; a cell
/// is `None` when fewer than two complete pairs exist or a metric has no
/// variance in the overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<Metric>,
    /// Row-major, indexed like `metrics`
    pub coefficients: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Metric, b: Metric) -> Option<f64> {
        let i = self.metrics.iter().position(|&m| m == a)?;
        let j = self.metrics.iter().position(|&m| m == b)?;
        self.coefficients[i][j]
    }
}

/// Correlate every metric pair over one city's observations
pub fn correlation_matrix(series: &CitySeries) -> CorrelationMatrix {
    let metrics = Metric::ALL.to_vec();
    let coefficients = metrics
        .iter()
        .map(|&a| {
            metrics
                .iter()
                .map(|&b| pearson(series, a, b))
                .collect()
        })
        .collect();

    CorrelationMatrix {
        metrics,
        coefficients,
    }
}

fn pearson(series: &CitySeries, a: Metric, b: Metric) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = series
        .observations()
        .iter()
        .filter_map(|o| Some((o.value(a)?, o.value(b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let cov: f64 = pairs
        .iter()
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum();
    let var_a: f64 = pairs.iter().map(|(x, _)| (x - mean_a).powi(2)).sum();
    let var_b: f64 = pairs.iter().map(|(_, y)| (y - mean_b).powi(2)).sum();

    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}
