//! Per-series state owned by the manager.
//!
//! Each registered series owns its active-window table, its materialized
//! candle store and its last-seen timestamp guard, so removing a series is a
//! single map removal and sharding by series needs no cross-table fixups.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use crate::aggregate::TimeWindow;
use crate::error::{KlineError, Result};
use crate::manager::config::ManagerConfig;
use crate::model::{
    is_valid_timestamp, DataPoint, Granularity, MaterializedPoint, SeriesDefinition, Timestamp,
};

pub(crate) struct SeriesState {
    definition: SeriesDefinition,
    /// Open windows: granularity -> aligned start -> window.
    active: BTreeMap<Granularity, BTreeMap<Timestamp, TimeWindow>>,
    /// Closed candles per granularity, ascending by start.
    materialized: BTreeMap<Granularity, VecDeque<MaterializedPoint>>,
    last_timestamp: Option<Timestamp>,
}

impl SeriesState {
    pub(crate) fn new(definition: SeriesDefinition) -> Self {
        Self {
            definition,
            active: BTreeMap::new(),
            materialized: BTreeMap::new(),
            last_timestamp: None,
        }
    }

    pub(crate) fn definition(&self) -> &SeriesDefinition {
        &self.definition
    }

    pub(crate) fn last_timestamp(&self) -> Option<Timestamp> {
        self.last_timestamp
    }

    /// Checks `point` against the value rules and the ordering guard.
    ///
    /// `last_seen` is passed explicitly so batches can be validated against a
    /// running guard without touching state.
    pub(crate) fn validate(&self, point: &DataPoint, last_seen: Option<Timestamp>) -> Result<()> {
        let series_id = self.definition.id.as_str();
        if !is_valid_timestamp(point.timestamp) {
            return Err(KlineError::invalid_point(
                series_id,
                format!("timestamp {} is out of range", point.timestamp),
            ));
        }
        if !point.value.is_finite() {
            return Err(KlineError::invalid_point(
                series_id,
                format!("value {} is not finite", point.value),
            ));
        }
        if let Some(volume) = point.volume {
            if !volume.is_finite() || volume < 0.0 {
                return Err(KlineError::invalid_point(
                    series_id,
                    format!("volume {} is not a finite non-negative number", volume),
                ));
            }
        }
        if let Some(last_seen) = last_seen {
            if point.timestamp < last_seen {
                return Err(KlineError::OutOfOrder {
                    series_id: series_id.to_string(),
                    timestamp: point.timestamp,
                    last_seen,
                });
            }
        }
        Ok(())
    }

    /// Folds a validated point into every granularity and closes the windows
    /// it has moved past. Returns the number of windows closed.
    pub(crate) fn ingest(&mut self, point: &DataPoint, config: &ManagerConfig) -> usize {
        let timestamp = point.timestamp;
        self.last_timestamp = Some(timestamp);

        for granularity in Granularity::ALL {
            let start = crate::aggregate::align_to_granularity(timestamp, granularity);
            let windows = self.active.entry(granularity).or_default();
            match windows.get_mut(&start) {
                Some(window) => window.fold(point, config.retain_raw_points),
                None => {
                    let window = TimeWindow::open(
                        &self.definition.id,
                        granularity,
                        point,
                        config.retain_raw_points,
                    );
                    windows.insert(start, window);
                }
            }
        }

        self.close_expired(timestamp, config.max_points_per_granularity)
    }

    /// Closes every open window whose end is at or before `now`.
    fn close_expired(&mut self, now: Timestamp, cap: Option<usize>) -> usize {
        let mut closed = 0;
        for (&granularity, windows) in self.active.iter_mut() {
            // end <= now  <=>  start <= now - duration
            let first_open = now - granularity.duration_ms() + 1;
            let still_open = windows.split_off(&first_open);
            let expired = std::mem::replace(windows, still_open);
            if expired.is_empty() {
                continue;
            }

            let store = self.materialized.entry(granularity).or_default();
            for (_, window) in expired {
                let candle = window.close().project(&self.definition.metrics);
                debug!(
                    "Materialized {}:{} candle [{}, {}) from {} points",
                    candle.series_id, granularity, candle.start, candle.end, candle.count
                );
                store.push_back(candle);
                closed += 1;
            }
            if let Some(cap) = cap {
                while store.len() > cap {
                    store.pop_front();
                }
            }
        }
        closed
    }

    /// Candles of `granularity` lying entirely within `[start, end]`.
    pub(crate) fn contained(
        &self,
        granularity: Granularity,
        start: Timestamp,
        end: Timestamp,
    ) -> impl Iterator<Item = &MaterializedPoint> + '_ {
        let store = self.materialized.get(&granularity);
        let first = store.map_or(0, |s| s.partition_point(|p| p.start < start));
        store
            .into_iter()
            .flat_map(move |s| s.iter().skip(first))
            .take_while(move |p| p.end <= end)
    }

    pub(crate) fn latest(&self, granularity: Granularity) -> Option<&MaterializedPoint> {
        self.materialized.get(&granularity).and_then(|s| s.back())
    }

    pub(crate) fn active_window(&self, granularity: Granularity) -> Option<&TimeWindow> {
        self.active
            .get(&granularity)
            .and_then(|windows| windows.values().next_back())
    }

    /// Drops candles with `end < before`. Returns the number dropped.
    pub(crate) fn clear_before(&mut self, before: Timestamp) -> usize {
        let mut dropped = 0;
        for store in self.materialized.values_mut() {
            while store.front().is_some_and(|p| p.end < before) {
                store.pop_front();
                dropped += 1;
            }
        }
        dropped
    }

    pub(crate) fn clear_materialized(&mut self) -> usize {
        let dropped = self.materialized_count();
        self.materialized.clear();
        dropped
    }

    pub(crate) fn clear_active(&mut self) -> usize {
        let dropped = self.active_count();
        self.active.clear();
        dropped
    }

    pub(crate) fn active_count(&self) -> usize {
        self.active.values().map(BTreeMap::len).sum()
    }

    pub(crate) fn materialized_count(&self) -> usize {
        self.materialized.values().map(VecDeque::len).sum()
    }
}
