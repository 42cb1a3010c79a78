//! Kline - Alopex Multi-Granularity Candle Engine
//!
//! This crate ingests strictly time-ordered tick streams per named series and
//! incrementally materializes OHLC+VWAP candles at eleven fixed granularities,
//! entirely in memory.
//!
//! # Components
//!
//! - [`Granularity`], [`SeriesDefinition`], [`DataPoint`], [`MaterializedPoint`]: domain vocabulary
//! - [`align_to_granularity`] / [`window_key`]: natural-boundary bucket alignment
//! - [`Accumulator`]: O(1) incremental OHLC/VWAP aggregation
//! - [`TimeSeriesManager`]: series registry, window lifecycle and range queries
//! - [`RetentionManager`]: age-based candle eviction
//!
//! # Example
//!
//! ```rust
//! use alopex_kline::{AggregationQuery, DataPoint, Granularity, SeriesDefinition, TimeSeriesManager};
//!
//! let mut manager = TimeSeriesManager::default();
//! manager.create_series(SeriesDefinition::continuous("AAPL", "Apple"))?;
//!
//! // Two ticks in the first minute, one in the second.
//! manager.add_data_point("AAPL", DataPoint::new(10_000, 100.0).with_volume(10.0))?;
//! manager.add_data_point("AAPL", DataPoint::new(40_000, 110.0).with_volume(20.0))?;
//! manager.add_data_point("AAPL", DataPoint::new(65_000, 108.0).with_volume(5.0))?;
//!
//! // The second-minute tick closed the first one-minute window.
//! let query = AggregationQuery::new("AAPL", Granularity::Minute1, 0, 60_000);
//! let candles = manager.query_aggregated_data(&query)?;
//! assert_eq!(candles[0].high, 110.0);
//! assert_eq!(candles[0].volume, 30.0);
//! # Ok::<(), alopex_kline::KlineError>(())
//! ```

#![deny(missing_docs)]

pub mod aggregate;
pub mod error;
pub mod lifecycle;
pub mod manager;
pub mod model;

pub use aggregate::{align_to_granularity, window_end, window_key, Accumulator, TimeWindow, WindowKey};
pub use error::{KlineError, Result};
pub use lifecycle::{DefaultRetentionPolicy, RetentionManager, RetentionPolicy};
pub use manager::{
    DuplicateSeriesPolicy, ManagerConfig, ManagerStats, SharedTimeSeriesManager, TimeSeriesManager,
};
pub use model::{
    AggregationQuery, DataPoint, DataType, Granularity, MaterializedPoint, Metric,
    MissingDataStrategy, SeriesDefinition, SeriesId, Timestamp,
};
