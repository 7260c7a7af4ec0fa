//! Core data model and summary statistics for city weather analysis
//!
//! This crate provides the per-city observation series all analysis
//! components read from, plus the shared error taxonomy. Series are
//! immutable after construction, so every computation over them is a
//! pure function that may run concurrently without locking.

pub mod seasons;
pub mod stats;
pub mod types;

pub use seasons::*;
pub use stats::*;
pub use types::*;

use thiserror::Error;

/// Error taxonomy shared by every analysis component.
///
/// A missing result is always visibly missing: no component converts one
/// of these into a zero or NaN result.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no valid {metric} data in requested window ({detail})")]
    EmptyRange { metric: Metric, detail: String },

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("insufficient history: {have} valid observations, need at least {need}")]
    InsufficientHistory { have: usize, need: usize },

    #[error("no overlapping dates across cities")]
    NoOverlap,

    #[error("unknown metric: {0}")]
    UnknownMetric(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
