//! Thread-safe handle around a [`TimeSeriesManager`].

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::manager::{ManagerConfig, ManagerStats, TimeSeriesManager};
use crate::model::{
    AggregationQuery, DataPoint, Granularity, MaterializedPoint, SeriesDefinition, Timestamp,
};

/// Cloneable handle guarding one manager with a single coarse lock.
///
/// Ingestion and retention take the write lock; queries take the read lock.
/// Every operation holds the lock for its whole duration, so registry
/// mutations and ingestion never interleave.
#[derive(Clone, Default)]
pub struct SharedTimeSeriesManager {
    inner: Arc<RwLock<TimeSeriesManager>>,
}

impl SharedTimeSeriesManager {
    /// Creates a handle around a new manager.
    pub fn new(config: ManagerConfig) -> Self {
        Self::from_manager(TimeSeriesManager::new(config))
    }

    /// Wraps an existing manager.
    pub fn from_manager(manager: TimeSeriesManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(manager)),
        }
    }

    /// Acquires the read lock.
    pub fn read(&self) -> RwLockReadGuard<'_, TimeSeriesManager> {
        self.inner.read()
    }

    /// Acquires the write lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, TimeSeriesManager> {
        self.inner.write()
    }

    /// See [`TimeSeriesManager::create_series`].
    pub fn create_series(&self, definition: SeriesDefinition) -> Result<()> {
        self.inner.write().create_series(definition)
    }

    /// See [`TimeSeriesManager::remove_series`].
    pub fn remove_series(&self, series_id: &str) -> bool {
        self.inner.write().remove_series(series_id)
    }

    /// See [`TimeSeriesManager::add_data_point`].
    pub fn add_data_point(&self, series_id: &str, point: DataPoint) -> Result<usize> {
        self.inner.write().add_data_point(series_id, point)
    }

    /// See [`TimeSeriesManager::add_data_points`].
    pub fn add_data_points(&self, series_id: &str, points: &[DataPoint]) -> Result<usize> {
        self.inner.write().add_data_points(series_id, points)
    }

    /// See [`TimeSeriesManager::query_aggregated_data`].
    pub fn query_aggregated_data(&self, query: &AggregationQuery) -> Result<Vec<MaterializedPoint>> {
        self.inner.read().query_aggregated_data(query)
    }

    /// See [`TimeSeriesManager::query_filled`].
    pub fn query_filled(&self, query: &AggregationQuery) -> Result<Vec<MaterializedPoint>> {
        self.inner.read().query_filled(query)
    }

    /// See [`TimeSeriesManager::get_latest_data`]. Returns an owned candle.
    pub fn get_latest_data(
        &self,
        series_id: &str,
        granularity: Granularity,
    ) -> Result<Option<MaterializedPoint>> {
        Ok(self
            .inner
            .read()
            .get_latest_data(series_id, granularity)?
            .cloned())
    }

    /// See [`TimeSeriesManager::current_candle`].
    pub fn current_candle(
        &self,
        series_id: &str,
        granularity: Granularity,
    ) -> Option<MaterializedPoint> {
        self.inner.read().current_candle(series_id, granularity)
    }

    /// See [`TimeSeriesManager::clear_aggregated_data_before`].
    pub fn clear_aggregated_data_before(&self, series_id: &str, before: Timestamp) -> Result<usize> {
        self.inner
            .write()
            .clear_aggregated_data_before(series_id, before)
    }

    /// See [`TimeSeriesManager::clear_aggregated_data`].
    pub fn clear_aggregated_data(&self, series_id: &str) -> Result<usize> {
        self.inner.write().clear_aggregated_data(series_id)
    }

    /// See [`TimeSeriesManager::clear_active_windows`].
    pub fn clear_active_windows(&self, series_id: &str) -> Result<usize> {
        self.inner.write().clear_active_windows(series_id)
    }

    /// See [`TimeSeriesManager::stats`].
    pub fn stats(&self) -> ManagerStats {
        self.inner.read().stats()
    }
}
