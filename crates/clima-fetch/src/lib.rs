//! Observation source adapters
//!
//! The analysis core never performs I/O; it reads series that were
//! materialized up front through one of these sources. A source must
//! keep "the source is unreachable" distinguishable from "the range is
//! valid but empty": the former is an error, the latter an empty vec.

pub mod file;
#[cfg(feature = "http")]
pub mod http;

pub use file::*;
#[cfg(feature = "http")]
pub use http::*;

use clima_core::{DateRange, Observation};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Provider of raw daily records for a city
///
/// Returned observations convert 1:1 into the core data model. An empty
/// vec means the range holds no data; transport failures surface as
/// `FetchError::Unavailable`. Retry policy, if any, lives inside the
/// source implementation, never in the analysis core.
#[async_trait::async_trait]
pub trait ObservationSource: Send + Sync {
    /// Source name/identifier
    fn name(&self) -> &str;

    /// Daily observations for a city, restricted to the given range
    async fn fetch_daily(&self, city: &str, range: &DateRange) -> FetchResult<Vec<Observation>>;
}
