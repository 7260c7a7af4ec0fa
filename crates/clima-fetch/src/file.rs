//! File-backed observation source
//!
//! Reads the cached daily payloads the fetcher writes to disk, one JSON
//! file per city (`<dir>/<city>_daily.json`).

use crate::{FetchError, FetchResult, ObservationSource};
use chrono::NaiveDate;
use clima_core::{DateRange, Observation};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Raw daily record as stored on disk
#[derive(Debug, Deserialize)]
struct RawDaily {
    date: NaiveDate,
    temperature: Option<f64>,
    precipitation: Option<f64>,
    wind_speed: Option<f64>,
    pressure: Option<f64>,
}

impl From<RawDaily> for Observation {
    fn from(raw: RawDaily) -> Self {
        Observation {
            date: raw.date,
            temperature: raw.temperature,
            precipitation: raw.precipitation,
            wind_speed: raw.wind_speed,
            pressure: raw.pressure,
        }
    }
}

pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn city_path(&self, city: &str) -> PathBuf {
        let stem = city.to_lowercase().replace(' ', "_");
        self.dir.join(format!("{}_daily.json", stem))
    }
}

#[async_trait::async_trait]
impl ObservationSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch_daily(&self, city: &str, range: &DateRange) -> FetchResult<Vec<Observation>> {
        let path = self.city_path(city);
        let payload = tokio::fs::read_to_string(&path).await.map_err(|e| {
            FetchError::Unavailable(format!("cannot read {}: {}", path.display(), e))
        })?;

        let raw: Vec<RawDaily> = serde_json::from_str(&payload)?;
        let observations: Vec<Observation> = raw
            .into_iter()
            .map(Observation::from)
            .filter(|o| range.contains(o.date))
            .collect();

        tracing::debug!(
            city,
            records = observations.len(),
            path = %path.display(),
            "loaded daily observations"
        );
        Ok(observations)
    }
}
