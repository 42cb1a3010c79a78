//! Integration tests for retention sweeps over a live manager.

use alopex_kline::{
    AggregationQuery, DataPoint, DefaultRetentionPolicy, Granularity, RetentionManager,
    RetentionPolicy, SeriesDefinition, SharedTimeSeriesManager, TimeSeriesManager,
};
use std::time::Duration;

const MIN: i64 = 60_000;
const DAY: i64 = 24 * 60 * MIN;

#[derive(Debug, Clone)]
struct ImmediateExpiry;

impl RetentionPolicy for ImmediateExpiry {
    fn retention_duration(&self) -> Duration {
        Duration::from_secs(0)
    }
}

#[test]
fn test_retention_keeps_recent_candles() {
    let mut manager = TimeSeriesManager::default();
    manager
        .create_series(SeriesDefinition::continuous("X", "x"))
        .unwrap();

    // One tick per hour for ten days.
    for hour in 0..(10 * 24) {
        manager
            .add_data_point("X", DataPoint::new(hour * 60 * MIN, hour as f64))
            .unwrap();
    }

    let retention = RetentionManager::new(DefaultRetentionPolicy::default());
    let dropped = retention.run_at_data_time(&mut manager);
    assert!(dropped > 0);

    let now = manager.last_timestamp("X").unwrap();
    let cutoff = retention.policy().cutoff(now);
    for g in Granularity::ALL {
        let candles = manager
            .query_aggregated_data(&AggregationQuery::new("X", g, i64::MIN, i64::MAX))
            .unwrap();
        for candle in candles {
            assert!(candle.end >= cutoff);
            assert!(!retention.policy().is_expired(&candle, now));
        }
    }

    // Daily candles ending on day 3 or later survive a 7-day window at ~day 10.
    let daily = manager
        .query_aggregated_data(&AggregationQuery::new("X", Granularity::Day1, 0, 10 * DAY))
        .unwrap();
    assert_eq!(daily.first().map(|c| c.end), Some(3 * DAY));
}

#[test]
fn test_immediate_expiry_on_shared_manager() {
    let shared = SharedTimeSeriesManager::default();
    shared
        .create_series(SeriesDefinition::continuous("X", "x"))
        .unwrap();
    for i in 0..4 {
        shared.add_data_point("X", DataPoint::new(i * MIN, 1.0)).unwrap();
    }
    assert_eq!(shared.stats().materialized_points, 3);

    let retention = RetentionManager::new(ImmediateExpiry);
    let dropped = retention.run_shared(&shared, 10 * MIN);
    assert_eq!(dropped, 3);
    assert_eq!(shared.stats().materialized_points, 0);

    // Open windows are untouched by retention.
    assert!(shared.read().active_window("X", Granularity::Minute1).is_some());
}
