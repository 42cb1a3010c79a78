//! Domain vocabulary shared by the aggregation engine.
//!
//! Granularities, metrics, data classifications, missing-data strategies and
//! the shapes of raw points, windows and candles. Nothing here mutates state.

pub mod granularity;
pub mod point;
pub mod series;

pub use granularity::Granularity;
pub use point::{AggregationQuery, DataPoint, MaterializedPoint};
pub use series::{DataType, Metric, MissingDataStrategy, SeriesDefinition};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// Unique series identifier.
pub type SeriesId = String;

/// Earliest timestamp the engine accepts.
///
/// Aligning anything earlier to the coarsest granularity would overflow.
pub const MIN_TIMESTAMP: Timestamp = i64::MIN + Granularity::MAX_DURATION_MS;

/// Latest timestamp the engine accepts.
///
/// Computing the end of the coarsest bucket past this point would overflow.
pub const MAX_TIMESTAMP: Timestamp = i64::MAX - Granularity::MAX_DURATION_MS;

/// Returns true if `timestamp` can be aligned and bounded at every granularity.
pub fn is_valid_timestamp(timestamp: Timestamp) -> bool {
    (MIN_TIMESTAMP..=MAX_TIMESTAMP).contains(&timestamp)
}
