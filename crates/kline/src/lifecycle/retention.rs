//! Retention policy and manager for age-based candle eviction.
//!
//! Retention is driven by a caller-supplied `now`, never by a timer. A
//! scheduled purge job passes wall-clock time; a replay passes data time via
//! [`RetentionManager::run_at_data_time`].

use crate::manager::{SharedTimeSeriesManager, TimeSeriesManager};
use crate::model::{MaterializedPoint, Timestamp};
use std::time::Duration;
use tracing::{error, info};

/// Retention policy for determining expired candles.
pub trait RetentionPolicy: Send + Sync {
    /// Returns the retention duration.
    fn retention_duration(&self) -> Duration;

    /// Returns the retention duration in milliseconds.
    fn retention_ms(&self) -> Timestamp {
        Timestamp::try_from(self.retention_duration().as_millis()).unwrap_or(Timestamp::MAX)
    }

    /// Returns the cutoff: candles ending before it are expired at `now`.
    fn cutoff(&self, now: Timestamp) -> Timestamp {
        now.saturating_sub(self.retention_ms())
    }

    /// Returns true if the candle is expired at the given time.
    fn is_expired(&self, point: &MaterializedPoint, now: Timestamp) -> bool {
        point.end < self.cutoff(now)
    }
}

/// Default retention policy (7 days).
#[derive(Debug, Clone)]
pub struct DefaultRetentionPolicy {
    retention: Duration,
}

impl Default for DefaultRetentionPolicy {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

impl DefaultRetentionPolicy {
    /// Creates a new default retention policy with a custom duration.
    pub fn new(retention: Duration) -> Self {
        Self { retention }
    }
}

impl RetentionPolicy for DefaultRetentionPolicy {
    fn retention_duration(&self) -> Duration {
        self.retention
    }
}

/// Applies a retention policy to every series of a manager.
#[derive(Debug, Clone, Default)]
pub struct RetentionManager<P: RetentionPolicy> {
    policy: P,
}

impl<P: RetentionPolicy> RetentionManager<P> {
    /// Creates a new retention manager.
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    /// Returns the policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Drops every expired candle at `now`. Returns the number dropped.
    pub fn run(&self, manager: &mut TimeSeriesManager, now: Timestamp) -> usize {
        let cutoff = self.policy.cutoff(now);
        let series_ids: Vec<String> = manager.series_ids().cloned().collect();
        let mut dropped = 0;

        for series_id in series_ids {
            match manager.clear_aggregated_data_before(&series_id, cutoff) {
                Ok(count) => dropped += count,
                Err(err) => {
                    error!("Retention sweep failed for series {}: {:?}", series_id, err);
                }
            }
        }

        if dropped > 0 {
            info!("Retention dropped {} candles ending before {}", dropped, cutoff);
        }
        dropped
    }

    /// Runs retention with `now` set to the latest timestamp seen by any
    /// series. Does nothing if no series has received data.
    pub fn run_at_data_time(&self, manager: &mut TimeSeriesManager) -> usize {
        let latest = manager
            .series_ids()
            .filter_map(|id| manager.last_timestamp(id))
            .max();
        match latest {
            Some(now) => self.run(manager, now),
            None => 0,
        }
    }

    /// Runs retention on a shared manager under its write lock.
    pub fn run_shared(&self, manager: &SharedTimeSeriesManager, now: Timestamp) -> usize {
        self.run(&mut manager.write(), now)
    }
}
