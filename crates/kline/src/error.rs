//! Error and Result types for candle aggregation.

use crate::model::{SeriesId, Timestamp};
use thiserror::Error;

/// A convenience `Result` type for aggregation operations.
pub type Result<T> = std::result::Result<T, KlineError>;

/// The error type for aggregation operations.
///
/// Every variant is local to the call that produced it. A failed call leaves
/// the manager exactly as it was, so callers may retry with corrected input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KlineError {
    /// The operation referenced a series id that is not registered.
    #[error("Series not found: {0}")]
    SeriesNotFound(SeriesId),

    /// A series with this id is already registered and the manager is
    /// configured to reject duplicates.
    #[error("Series already exists: {0}")]
    DuplicateSeries(SeriesId),

    /// The data point carries a non-finite value or volume, or a timestamp
    /// outside the representable range.
    #[error("Invalid data point for series {series_id}: {reason}")]
    InvalidDataPoint {
        /// Series the point was addressed to.
        series_id: SeriesId,
        /// Human-readable description of the violation.
        reason: String,
    },

    /// The data point is older than the last point accepted for its series.
    #[error("Out-of-order data point for series {series_id}: timestamp {timestamp} precedes last seen {last_seen}")]
    OutOfOrder {
        /// Series the point was addressed to.
        series_id: SeriesId,
        /// Timestamp of the rejected point.
        timestamp: Timestamp,
        /// Last timestamp accepted for the series.
        last_seen: Timestamp,
    },

    /// Query start is after query end.
    #[error("Invalid query range: start {start} is after end {end}")]
    InvalidQueryRange {
        /// Requested start (inclusive).
        start: Timestamp,
        /// Requested end (inclusive).
        end: Timestamp,
    },

    /// A granularity label could not be parsed.
    #[error("Unknown granularity: {0}")]
    UnknownGranularity(String),
}

impl KlineError {
    pub(crate) fn invalid_point(series_id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDataPoint {
            series_id: series_id.to_string(),
            reason: reason.into(),
        }
    }
}
