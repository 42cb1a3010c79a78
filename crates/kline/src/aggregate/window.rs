//! One granularity bucket of one series while it is open.

use crate::aggregate::accumulator::Accumulator;
use crate::aggregate::align::{align_to_granularity, WindowKey};
use crate::model::{DataPoint, Granularity, MaterializedPoint, Timestamp};

/// An open aggregation window.
///
/// Created lazily by the first point falling in its bucket. A `TimeWindow`
/// is always active: closing consumes it and yields the candle, so a window
/// can never exist both open and materialized.
#[derive(Debug, Clone)]
pub struct TimeWindow {
    key: WindowKey,
    end: Timestamp,
    points: Vec<DataPoint>,
    accumulator: Accumulator,
}

impl TimeWindow {
    /// Opens the window containing `point` and folds the point in.
    ///
    /// When `retain_points` is false only the accumulator is kept.
    pub fn open(
        series_id: &str,
        granularity: Granularity,
        point: &DataPoint,
        retain_points: bool,
    ) -> Self {
        let start = align_to_granularity(point.timestamp, granularity);
        let mut window = Self {
            key: WindowKey {
                series_id: series_id.to_string(),
                granularity,
                start,
            },
            end: start + granularity.duration_ms(),
            points: Vec::new(),
            accumulator: Accumulator::initialize(),
        };
        window.fold(point, retain_points);
        window
    }

    /// Folds `point` into the accumulator and optionally buffers it.
    pub fn fold(&mut self, point: &DataPoint, retain_points: bool) {
        debug_assert!(self.contains(point.timestamp));
        self.accumulator = self.accumulator.fold(point);
        if retain_points {
            self.points.push(point.clone());
        }
    }

    /// Closes the window and returns its candle.
    pub fn close(self) -> MaterializedPoint {
        self.materialize()
    }

    /// Materializes the current state without closing.
    pub fn materialize(&self) -> MaterializedPoint {
        self.accumulator.materialize(
            self.key.start,
            self.end,
            &self.key.series_id,
            self.key.granularity,
        )
    }

    /// Returns true if `timestamp` falls within `[start, end)`.
    pub fn contains(&self, timestamp: Timestamp) -> bool {
        timestamp >= self.key.start && timestamp < self.end
    }

    /// Window identity.
    pub fn key(&self) -> &WindowKey {
        &self.key
    }

    /// Aligned start (inclusive).
    pub fn start(&self) -> Timestamp {
        self.key.start
    }

    /// Bucket end (exclusive).
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Bucket granularity.
    pub fn granularity(&self) -> Granularity {
        self.key.granularity
    }

    /// Buffered raw points, in arrival order.
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    /// Current accumulator.
    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }
}
