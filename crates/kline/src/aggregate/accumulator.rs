//! Incremental O(1) candle aggregation.
//!
//! An [`Accumulator`] is a plain `Copy` value. [`Accumulator::fold`] consumes
//! one and returns the next version; nothing is ever updated in place, so an
//! accumulator can be handed to another thread and materialized there.

use crate::model::{DataPoint, Granularity, MaterializedPoint, Timestamp};

/// Running aggregation state for one open window.
///
/// After at least one fold, `high >= max(open, close)` and
/// `low <= min(open, close)` hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accumulator {
    /// Number of points folded.
    pub count: u64,
    /// First value, absent until the first fold.
    pub open: Option<f64>,
    /// Running maximum.
    pub high: f64,
    /// Running minimum.
    pub low: f64,
    /// Most recent value.
    pub close: f64,
    /// Sum of explicit volumes.
    pub volume: f64,
    /// Σ value × weight, where weight is the volume or 1 when absent.
    pub price_volume_sum: f64,
    /// Σ weight.
    pub volume_sum: f64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::initialize()
    }
}

impl Accumulator {
    /// Returns the empty accumulator.
    pub const fn initialize() -> Self {
        Self {
            count: 0,
            open: None,
            high: f64::NEG_INFINITY,
            low: f64::INFINITY,
            close: 0.0,
            volume: 0.0,
            price_volume_sum: 0.0,
            volume_sum: 0.0,
        }
    }

    /// Folds one point in and returns the new accumulator.
    ///
    /// Points must be folded in arrival order; the last fold sets `close`.
    #[must_use]
    pub fn fold(self, point: &DataPoint) -> Self {
        let value = point.value;
        let weight = point.volume.unwrap_or(1.0);
        Self {
            count: self.count + 1,
            open: self.open.or(Some(value)),
            high: self.high.max(value),
            low: self.low.min(value),
            close: value,
            volume: self.volume + point.volume.unwrap_or(0.0),
            price_volume_sum: self.price_volume_sum + value * weight,
            volume_sum: self.volume_sum + weight,
        }
    }

    /// Volume-weighted average price, absent when no weight was folded.
    pub fn vwap(&self) -> Option<f64> {
        (self.volume_sum > 0.0).then(|| self.price_volume_sum / self.volume_sum)
    }

    /// Returns true if nothing has been folded yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Converts the accumulator into a candle for `[start, end)`.
    ///
    /// An empty accumulator materializes as an all-zero candle.
    pub fn materialize(
        &self,
        start: Timestamp,
        end: Timestamp,
        series_id: &str,
        granularity: Granularity,
    ) -> MaterializedPoint {
        let (open, high, low) = match self.open {
            Some(open) => (open, self.high, self.low),
            None => (0.0, 0.0, 0.0),
        };
        MaterializedPoint {
            series_id: series_id.to_string(),
            granularity,
            start,
            end,
            open,
            high,
            low,
            close: self.close,
            volume: self.volume,
            vwap: self.vwap(),
            count: self.count,
            created_at: end,
        }
    }
}
