//! Raw observations, materialized candles, and queries over them.

use crate::model::{Granularity, Metric, MissingDataStrategy, SeriesId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One raw observation.
///
/// # Examples
/// ```
/// use alopex_kline::DataPoint;
///
/// let tick = DataPoint::new(1_700_000_000_000, 101.5)
///     .with_volume(20.0)
///     .with_metadata("trade_id", "42");
/// assert_eq!(tick.volume, Some(20.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Observation time in milliseconds since the Unix epoch.
    pub timestamp: Timestamp,
    /// Observed value.
    pub value: f64,
    /// Optional traded volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl DataPoint {
    /// Creates a point without volume or metadata.
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self {
            timestamp,
            value,
            volume: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Sets the volume.
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Adds one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// An immutable OHLC+VWAP candle produced when a window closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializedPoint {
    /// Series this candle belongs to.
    pub series_id: SeriesId,
    /// Bucket granularity.
    pub granularity: Granularity,
    /// Aligned bucket start (inclusive).
    pub start: Timestamp,
    /// Bucket end (exclusive).
    pub end: Timestamp,
    /// First value.
    pub open: f64,
    /// Highest value.
    pub high: f64,
    /// Lowest value.
    pub low: f64,
    /// Last value.
    pub close: f64,
    /// Summed volume.
    pub volume: f64,
    /// Volume-weighted average price, absent when no volume was folded.
    pub vwap: Option<f64>,
    /// Number of contributing raw points.
    pub count: u64,
    /// Creation time, equal to `end`.
    pub created_at: Timestamp,
}

impl MaterializedPoint {
    /// Builds a synthetic candle for an empty bucket.
    ///
    /// `previous_close` is the close of the nearest earlier candle and is only
    /// used by [`MissingDataStrategy::CarryForward`].
    pub fn gap(
        series_id: &str,
        granularity: Granularity,
        start: Timestamp,
        strategy: MissingDataStrategy,
        previous_close: f64,
    ) -> Self {
        let price = match strategy {
            MissingDataStrategy::CarryForward => previous_close,
            MissingDataStrategy::FillZero => 0.0,
        };
        let end = start + granularity.duration_ms();
        Self {
            series_id: series_id.to_string(),
            granularity,
            start,
            end,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 0.0,
            vwap: None,
            count: 0,
            created_at: end,
        }
    }

    /// Drops the optional metrics a series does not compute.
    ///
    /// OHLC and the point count are always kept.
    pub(crate) fn project(mut self, metrics: &BTreeSet<Metric>) -> Self {
        if !metrics.contains(&Metric::Volume) {
            self.volume = 0.0;
        }
        if !metrics.contains(&Metric::Vwap) {
            self.vwap = None;
        }
        self
    }

    /// Returns true if this candle lies entirely within `[start, end]`.
    pub fn is_contained_in(&self, start: Timestamp, end: Timestamp) -> bool {
        self.start >= start && self.end <= end
    }
}

/// Range query over materialized candles of one series and granularity.
///
/// Both bounds are inclusive and containment is strict: a candle is returned
/// only if `candle.start >= start` and `candle.end <= end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationQuery {
    /// Series to query.
    pub series_id: SeriesId,
    /// Granularity to query.
    pub granularity: Granularity,
    /// Earliest candle start.
    pub start: Timestamp,
    /// Latest candle end.
    pub end: Timestamp,
}

impl AggregationQuery {
    /// Creates a query.
    pub fn new(
        series_id: impl Into<SeriesId>,
        granularity: Granularity,
        start: Timestamp,
        end: Timestamp,
    ) -> Self {
        Self {
            series_id: series_id.into(),
            granularity,
            start,
            end,
        }
    }
}
