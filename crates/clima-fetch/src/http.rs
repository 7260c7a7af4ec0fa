//! HTTP observation source (OpenWeather-style daily endpoint)

use crate::{FetchError, FetchResult, ObservationSource};
use chrono::DateTime;
use clima_core::{DateRange, Observation};
use serde::Deserialize;

/// Daily-forecast API payload
#[derive(Debug, Deserialize)]
struct DailyPayload {
    list: Vec<DailyEntry>,
}

#[derive(Debug, Deserialize)]
struct DailyEntry {
    /// Unix timestamp of the day
    dt: i64,
    temp: DailyTemp,
    #[serde(default)]
    rain: Option<f64>,
    /// Wind speed
    #[serde(default)]
    speed: Option<f64>,
    #[serde(default)]
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DailyTemp {
    day: Option<f64>,
}

pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait::async_trait]
impl ObservationSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_daily(&self, city: &str, range: &DateRange) -> FetchResult<Vec<Observation>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|e| FetchError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Unavailable(format!(
                "HTTP {} for {}",
                response.status(),
                city
            )));
        }

        let payload: DailyPayload = response
            .json()
            .await
            .map_err(|e| FetchError::InvalidPayload(e.to_string()))?;

        let observations = payload
            .list
            .into_iter()
            .filter_map(convert_entry)
            .filter(|o| range.contains(o.date))
            .collect();
        Ok(observations)
    }
}

fn convert_entry(entry: DailyEntry) -> Option<Observation> {
    let date = DateTime::from_timestamp(entry.dt, 0)?.date_naive();
    Some(Observation {
        date,
        temperature: entry.temp.day,
        precipitation: entry.rain,
        wind_speed: entry.speed,
        pressure: entry.pressure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_conversion() {
        let entry = DailyEntry {
            dt: 1_704_067_200, // 2024-01-01 00:00:00 UTC
            temp: DailyTemp { day: Some(3.5) },
            rain: None,
            speed: Some(12.0),
            pressure: Some(1021.0),
        };

        let obs = convert_entry(entry).unwrap();
        assert_eq!(
            obs.date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(obs.temperature, Some(3.5));
        assert_eq!(obs.precipitation, None);
    }

    #[test]
    fn test_payload_parsing() {
        let json = r#"{"list":[{"dt":1704067200,"temp":{"day":3.5},"speed":12.0,"pressure":1021.0}]}"#;
        let payload: DailyPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.list.len(), 1);
        assert_eq!(payload.list[0].rain, None);
    }
}
