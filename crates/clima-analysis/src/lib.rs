//! Analysis components over immutable city series
//!
//! Anomaly detection, extreme event identification, temperature
//! forecasting, cross-city comparison, and metric correlation. Every
//! function here is pure: it reads a `CitySeries` snapshot and returns
//! freshly computed value objects owned by the caller.

pub mod anomaly;
pub mod compare;
pub mod correlate;
pub mod extremes;
pub mod forecast;

pub use anomaly::*;
pub use compare::*;
pub use correlate::*;
pub use extremes::*;
pub use forecast::*;
