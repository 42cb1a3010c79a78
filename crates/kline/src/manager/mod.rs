//! Time-series manager for multi-granularity candle materialization.
//!
//! This module provides the [`TimeSeriesManager`], which owns the series
//! registry and, per series, the active-window table, the materialized candle
//! store and the last-seen timestamp guard.
//!
//! # Lifecycle
//!
//! Every ingested point is folded into the open window of each of the eleven
//! granularities. Windows close only when a later point arrives whose
//! timestamp is at or past their end; there are no timers. A closed window is
//! materialized into an immutable candle and evicted from the active table in
//! the same step.
//!
//! # Example
//!
//! ```
//! use alopex_kline::{AggregationQuery, DataPoint, Granularity, SeriesDefinition, TimeSeriesManager};
//!
//! let mut manager = TimeSeriesManager::default();
//! manager.create_series(SeriesDefinition::continuous("X", "price"))?;
//!
//! manager.add_data_point("X", DataPoint::new(5_000, 100.0).with_volume(10.0))?;
//! manager.add_data_point("X", DataPoint::new(65_000, 105.0).with_volume(5.0))?;
//!
//! let candles = manager.query_aggregated_data(&AggregationQuery::new("X", Granularity::Minute1, 0, 60_000))?;
//! assert_eq!(candles.len(), 1);
//! assert_eq!(candles[0].vwap, Some(100.0));
//! # Ok::<(), alopex_kline::KlineError>(())
//! ```
//!
//! # Concurrency
//!
//! The manager is not internally synchronized. Wrap it in
//! [`SharedTimeSeriesManager`] to share it between threads.

pub mod config;
mod series;
pub mod shared;

pub use config::{DuplicateSeriesPolicy, ManagerConfig};
pub use shared::SharedTimeSeriesManager;

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::aggregate::TimeWindow;
use crate::error::{KlineError, Result};
use crate::model::{
    AggregationQuery, DataPoint, Granularity, MaterializedPoint, SeriesDefinition, SeriesId,
    Timestamp,
};
use series::SeriesState;

/// Statistics for the time-series manager.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerStats {
    /// Number of registered series.
    pub series_count: usize,
    /// Number of open windows across all series and granularities.
    pub active_windows: usize,
    /// Number of stored candles across all series and granularities.
    pub materialized_points: usize,
    /// Points accepted since creation.
    pub ingested_points: u64,
    /// Points rejected since creation.
    pub rejected_points: u64,
}

/// Owns every series and turns their tick streams into candles.
#[derive(Default)]
pub struct TimeSeriesManager {
    series: HashMap<SeriesId, SeriesState>,
    config: ManagerConfig,
    ingested_points: u64,
    rejected_points: u64,
}

impl TimeSeriesManager {
    /// Creates a new manager with the given configuration.
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            series: HashMap::new(),
            config,
            ingested_points: 0,
            rejected_points: 0,
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Registers a series.
    ///
    /// # Errors
    ///
    /// Returns `KlineError::DuplicateSeries` if the id is already registered
    /// and the duplicate policy is [`DuplicateSeriesPolicy::Reject`]. Under
    /// [`DuplicateSeriesPolicy::Replace`] the old series and all of its
    /// windows and candles are discarded.
    pub fn create_series(&mut self, definition: SeriesDefinition) -> Result<()> {
        if self.series.contains_key(&definition.id) {
            match self.config.duplicate_series {
                DuplicateSeriesPolicy::Reject => {
                    return Err(KlineError::DuplicateSeries(definition.id));
                }
                DuplicateSeriesPolicy::Replace => {
                    debug!("Replacing series {}", definition.id);
                }
            }
        } else {
            debug!("Registered series {} ({})", definition.id, definition.name);
        }

        self.series
            .insert(definition.id.clone(), SeriesState::new(definition));
        Ok(())
    }

    /// Removes a series and everything derived from it.
    ///
    /// Removing an unknown series is a no-op. Returns true if the series
    /// existed.
    pub fn remove_series(&mut self, series_id: &str) -> bool {
        let removed = self.series.remove(series_id).is_some();
        if removed {
            debug!("Removed series {}", series_id);
        }
        removed
    }

    /// Returns the definition of a series.
    pub fn get_series(&self, series_id: &str) -> Option<&SeriesDefinition> {
        self.series.get(series_id).map(SeriesState::definition)
    }

    /// Returns true if the series is registered.
    pub fn contains_series(&self, series_id: &str) -> bool {
        self.series.contains_key(series_id)
    }

    /// Returns an iterator over registered series ids.
    pub fn series_ids(&self) -> impl Iterator<Item = &SeriesId> {
        self.series.keys()
    }

    /// Returns the last accepted timestamp of a series.
    pub fn last_timestamp(&self, series_id: &str) -> Option<Timestamp> {
        self.series.get(series_id).and_then(SeriesState::last_timestamp)
    }

    /// Ingests one data point.
    ///
    /// The point is folded into the open window of every granularity, then
    /// every window whose end is at or before the point's timestamp is closed
    /// and materialized. Returns the number of windows closed.
    ///
    /// # Errors
    ///
    /// - `KlineError::SeriesNotFound` if the series is not registered
    /// - `KlineError::InvalidDataPoint` for a non-finite value or volume, a
    ///   negative volume, or an out-of-range timestamp
    /// - `KlineError::OutOfOrder` if the timestamp precedes the series'
    ///   last-seen timestamp
    ///
    /// On error no state is modified.
    pub fn add_data_point(&mut self, series_id: &str, point: DataPoint) -> Result<usize> {
        let Some(state) = self.series.get_mut(series_id) else {
            return Err(KlineError::SeriesNotFound(series_id.to_string()));
        };

        if let Err(err) = state.validate(&point, state.last_timestamp()) {
            self.rejected_points += 1;
            warn!("Rejected data point: {}", err);
            return Err(err);
        }

        trace!(
            series = series_id,
            timestamp = point.timestamp,
            value = point.value,
            "ingest"
        );
        let closed = state.ingest(&point, &self.config);
        self.ingested_points += 1;
        Ok(closed)
    }

    /// Ingests a batch of data points in order.
    ///
    /// The whole batch is validated before any point is folded, so a rejected
    /// batch leaves the manager untouched. Returns the number of windows
    /// closed.
    ///
    /// # Errors
    ///
    /// Same as [`add_data_point`](Self::add_data_point), for the first
    /// offending point.
    pub fn add_data_points(&mut self, series_id: &str, points: &[DataPoint]) -> Result<usize> {
        let Some(state) = self.series.get_mut(series_id) else {
            return Err(KlineError::SeriesNotFound(series_id.to_string()));
        };

        let mut last_seen = state.last_timestamp();
        for point in points {
            if let Err(err) = state.validate(point, last_seen) {
                self.rejected_points += points.len() as u64;
                warn!("Rejected batch of {} data points: {}", points.len(), err);
                return Err(err);
            }
            last_seen = Some(point.timestamp);
        }

        let mut closed = 0;
        for point in points {
            closed += state.ingest(point, &self.config);
        }
        self.ingested_points += points.len() as u64;
        Ok(closed)
    }

    /// Returns candles fully contained in the query range, ascending by start.
    ///
    /// Candles only partially overlapping `[query.start, query.end]` are
    /// excluded. A series without data yields an empty vector.
    ///
    /// # Errors
    ///
    /// - `KlineError::SeriesNotFound` if the series is not registered
    /// - `KlineError::InvalidQueryRange` if `query.start > query.end`
    pub fn query_aggregated_data(&self, query: &AggregationQuery) -> Result<Vec<MaterializedPoint>> {
        let state = self.checked_query(query)?;
        Ok(state
            .contained(query.granularity, query.start, query.end)
            .cloned()
            .collect())
    }

    /// Like [`query_aggregated_data`](Self::query_aggregated_data), but fills
    /// empty buckets between the first and last returned candle according to
    /// the series' missing-data strategy.
    ///
    /// Gap candles stop being generated once the result holds
    /// [`ManagerConfig::max_filled_points`] entries. Stored candles are
    /// always returned.
    ///
    /// # Errors
    ///
    /// Same as [`query_aggregated_data`](Self::query_aggregated_data).
    pub fn query_filled(&self, query: &AggregationQuery) -> Result<Vec<MaterializedPoint>> {
        let state = self.checked_query(query)?;
        let strategy = state.definition().missing_data;
        let duration = query.granularity.duration_ms();

        let limit = self.config.max_filled_points;

        let mut filled = Vec::new();
        let mut skipped: i64 = 0;
        let mut previous: Option<&MaterializedPoint> = None;
        for candle in state.contained(query.granularity, query.start, query.end) {
            if let Some(prev) = previous {
                let mut start = prev.end;
                while start < candle.start && filled.len() < limit {
                    filled.push(MaterializedPoint::gap(
                        &query.series_id,
                        query.granularity,
                        start,
                        strategy,
                        prev.close,
                    ));
                    start += duration;
                }
                if start < candle.start {
                    skipped = skipped.saturating_add(candle.start.saturating_sub(start) / duration);
                }
            }
            filled.push(candle.clone());
            previous = Some(candle);
        }

        if skipped > 0 {
            warn!(
                "Gap fill for {}:{} capped at {} candles, {} buckets left empty",
                query.series_id, query.granularity, limit, skipped
            );
        }
        Ok(filled)
    }

    fn checked_query(&self, query: &AggregationQuery) -> Result<&SeriesState> {
        let state = self.state(&query.series_id)?;
        if query.start > query.end {
            return Err(KlineError::InvalidQueryRange {
                start: query.start,
                end: query.end,
            });
        }
        Ok(state)
    }

    /// Returns the most recent candle of a series at a granularity.
    ///
    /// # Errors
    ///
    /// Returns `KlineError::SeriesNotFound` if the series is not registered.
    pub fn get_latest_data(
        &self,
        series_id: &str,
        granularity: Granularity,
    ) -> Result<Option<&MaterializedPoint>> {
        Ok(self.state(series_id)?.latest(granularity))
    }

    /// Returns the open window of a series at a granularity.
    pub fn active_window(&self, series_id: &str, granularity: Granularity) -> Option<&TimeWindow> {
        self.series
            .get(series_id)
            .and_then(|state| state.active_window(granularity))
    }

    /// Materializes the open window without closing it.
    ///
    /// The result reflects every point received so far in the current bucket
    /// and changes as more points arrive.
    pub fn current_candle(
        &self,
        series_id: &str,
        granularity: Granularity,
    ) -> Option<MaterializedPoint> {
        let state = self.series.get(series_id)?;
        state
            .active_window(granularity)
            .map(|window| window.materialize().project(&state.definition().metrics))
    }

    /// Drops candles of a series whose end is before `before`.
    ///
    /// Returns the number of candles dropped.
    ///
    /// # Errors
    ///
    /// Returns `KlineError::SeriesNotFound` if the series is not registered.
    pub fn clear_aggregated_data_before(
        &mut self,
        series_id: &str,
        before: Timestamp,
    ) -> Result<usize> {
        let dropped = self.state_mut(series_id)?.clear_before(before);
        if dropped > 0 {
            debug!("Dropped {} candles of {} ending before {}", dropped, series_id, before);
        }
        Ok(dropped)
    }

    /// Drops every candle of a series.
    ///
    /// # Errors
    ///
    /// Returns `KlineError::SeriesNotFound` if the series is not registered.
    pub fn clear_aggregated_data(&mut self, series_id: &str) -> Result<usize> {
        Ok(self.state_mut(series_id)?.clear_materialized())
    }

    /// Discards every open window of a series without materializing it.
    ///
    /// The last-seen timestamp guard is kept.
    ///
    /// # Errors
    ///
    /// Returns `KlineError::SeriesNotFound` if the series is not registered.
    pub fn clear_active_windows(&mut self, series_id: &str) -> Result<usize> {
        Ok(self.state_mut(series_id)?.clear_active())
    }

    /// Returns statistics for the manager.
    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            series_count: self.series.len(),
            active_windows: self.series.values().map(SeriesState::active_count).sum(),
            materialized_points: self
                .series
                .values()
                .map(SeriesState::materialized_count)
                .sum(),
            ingested_points: self.ingested_points,
            rejected_points: self.rejected_points,
        }
    }

    fn state(&self, series_id: &str) -> Result<&SeriesState> {
        self.series
            .get(series_id)
            .ok_or_else(|| KlineError::SeriesNotFound(series_id.to_string()))
    }

    fn state_mut(&mut self, series_id: &str) -> Result<&mut SeriesState> {
        self.series
            .get_mut(series_id)
            .ok_or_else(|| KlineError::SeriesNotFound(series_id.to_string()))
    }
}
