//! Integration tests for the ingestion → window close → query path.
//!
//! These tests drive the public API the way a trade-generation producer and
//! a candle-serving consumer would.

use alopex_kline::{
    AggregationQuery, DataPoint, Granularity, KlineError, Metric, SeriesDefinition,
    TimeSeriesManager,
};

const SEC: i64 = 1_000;
const MIN: i64 = 60 * SEC;
const HOUR: i64 = 60 * MIN;

fn price_manager() -> TimeSeriesManager {
    let mut manager = TimeSeriesManager::default();
    manager
        .create_series(
            SeriesDefinition::continuous("X", "X price").with_metrics(Metric::ALL),
        )
        .unwrap();
    manager
}

fn tick(ts: i64, value: f64, volume: f64) -> DataPoint {
    DataPoint::new(ts, value).with_volume(volume)
}

// ============================================================================
// Candle correctness
// ============================================================================

/// One point per bucket: the next-minute tick closes the first bucket.
#[test]
fn test_single_point_window_closes_on_next_minute() {
    let mut manager = price_manager();
    manager.add_data_point("X", tick(5 * SEC, 100.0, 10.0)).unwrap();
    manager.add_data_point("X", tick(MIN + 5 * SEC, 105.0, 5.0)).unwrap();

    let candles = manager
        .query_aggregated_data(&AggregationQuery::new("X", Granularity::Minute1, 0, MIN))
        .unwrap();
    assert_eq!(candles.len(), 1);

    let c = &candles[0];
    assert_eq!((c.start, c.end), (0, MIN));
    assert_eq!((c.open, c.high, c.low, c.close), (100.0, 100.0, 100.0, 100.0));
    assert_eq!(c.volume, 10.0);
    assert_eq!(c.vwap, Some(100.0));
    assert_eq!(c.count, 1);
    assert_eq!(c.created_at, MIN);
}

/// Two points in one bucket.
#[test]
fn test_two_points_one_bucket() {
    let mut manager = price_manager();
    manager.add_data_point("X", tick(10 * SEC, 100.0, 10.0)).unwrap();
    manager.add_data_point("X", tick(40 * SEC, 110.0, 20.0)).unwrap();
    manager.add_data_point("X", tick(MIN + 5 * SEC, 107.0, 1.0)).unwrap();

    let c = manager
        .get_latest_data("X", Granularity::Minute1)
        .unwrap()
        .unwrap()
        .clone();
    assert_eq!((c.open, c.high, c.low, c.close), (100.0, 110.0, 100.0, 110.0));
    assert_eq!(c.volume, 30.0);
    let vwap = c.vwap.unwrap();
    assert!((vwap - (1000.0 + 2200.0) / 30.0).abs() < 1e-9);
    assert!((vwap - 106.67).abs() < 0.01);
}

/// Out-of-order rejection keeps the guard.
#[test]
fn test_out_of_order_rejected() {
    let mut manager = price_manager();
    manager.add_data_point("X", tick(10 * HOUR, 1.0, 1.0)).unwrap();

    let err = manager
        .add_data_point("X", tick(10 * HOUR - MIN, 2.0, 1.0))
        .unwrap_err();
    assert_eq!(
        err,
        KlineError::OutOfOrder {
            series_id: "X".to_string(),
            timestamp: 10 * HOUR - MIN,
            last_seen: 10 * HOUR,
        }
    );
    assert_eq!(manager.last_timestamp("X"), Some(10 * HOUR));
}

/// Query on a series without data is empty, not an error.
#[test]
fn test_query_without_data_is_empty() {
    let manager = price_manager();
    for g in Granularity::ALL {
        let candles = manager
            .query_aggregated_data(&AggregationQuery::new("X", g, 0, i64::MAX))
            .unwrap();
        assert!(candles.is_empty());
    }
}

/// Removal is total: the id is unknown afterwards.
#[test]
fn test_remove_series_then_ingest() {
    let mut manager = price_manager();
    manager.add_data_point("X", tick(0, 1.0, 1.0)).unwrap();
    manager.add_data_point("X", tick(MIN, 1.0, 1.0)).unwrap();

    assert!(manager.remove_series("X"));
    assert!(!manager.remove_series("X"));

    assert_eq!(
        manager.add_data_point("X", tick(2 * MIN, 1.0, 1.0)),
        Err(KlineError::SeriesNotFound("X".to_string()))
    );
    assert!(matches!(
        manager.query_aggregated_data(&AggregationQuery::new("X", Granularity::Minute1, 0, HOUR)),
        Err(KlineError::SeriesNotFound(_))
    ));
    assert_eq!(manager.stats().active_windows, 0);
    assert_eq!(manager.stats().materialized_points, 0);
}

// ============================================================================
// Window lifecycle
// ============================================================================

/// Windows close on data arrival only; an idle series keeps its window open.
#[test]
fn test_window_stays_open_without_later_data() {
    let mut manager = price_manager();
    manager.add_data_point("X", tick(0, 1.0, 1.0)).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));

    assert!(manager.get_latest_data("X", Granularity::Minute1).unwrap().is_none());
    let open = manager.active_window("X", Granularity::Minute1).unwrap();
    assert_eq!((open.start(), open.end()), (0, MIN));

    // A point just before the end still lands in the same window.
    manager.add_data_point("X", tick(MIN - 1, 2.0, 1.0)).unwrap();
    assert!(manager.get_latest_data("X", Granularity::Minute1).unwrap().is_none());
    assert_eq!(manager.active_window("X", Granularity::Minute1).unwrap().points().len(), 2);
}

/// A gap spanning several buckets closes only the buckets that had data.
#[test]
fn test_gap_closes_only_populated_windows() {
    let mut manager = price_manager();
    manager.add_data_point("X", tick(0, 1.0, 1.0)).unwrap();
    manager.add_data_point("X", tick(2 * HOUR + 30 * MIN, 2.0, 1.0)).unwrap();

    let minutes = manager
        .query_aggregated_data(&AggregationQuery::new("X", Granularity::Minute1, 0, 3 * HOUR))
        .unwrap();
    assert_eq!(minutes.len(), 1);

    let two_hours = manager
        .query_aggregated_data(&AggregationQuery::new("X", Granularity::Minute120, 0, 3 * HOUR))
        .unwrap();
    assert_eq!(two_hours.len(), 1);
    assert_eq!(two_hours[0].end, 2 * HOUR);

    // The daily window is still open and has seen both points.
    let daily = manager.current_candle("X", Granularity::Day1).unwrap();
    assert_eq!(daily.count, 2);
    assert_eq!((daily.open, daily.close), (1.0, 2.0));
}

/// Series are independent: one series' ticks never close another's windows.
#[test]
fn test_series_are_independent() {
    let mut manager = price_manager();
    manager
        .create_series(SeriesDefinition::discrete("X.vol", "X volume"))
        .unwrap();

    manager.add_data_point("X", tick(0, 100.0, 3.0)).unwrap();
    manager.add_data_point("X.vol", DataPoint::new(0, 3.0)).unwrap();
    manager.add_data_point("X", tick(5 * MIN, 101.0, 2.0)).unwrap();

    assert_eq!(
        manager
            .query_aggregated_data(&AggregationQuery::new("X", Granularity::Minute5, 0, HOUR))
            .unwrap()
            .len(),
        1
    );
    assert!(manager
        .query_aggregated_data(&AggregationQuery::new("X.vol", Granularity::Minute1, 0, HOUR))
        .unwrap()
        .is_empty());

    // Interleaving older data on another series is fine.
    manager.add_data_point("X.vol", DataPoint::new(MIN, 2.0)).unwrap();
}

/// Replaying the same ticks into two managers yields identical candles.
#[test]
fn test_independent_managers_agree() {
    let ticks: Vec<DataPoint> = (0..500)
        .map(|i| {
            let value = 100.0 + (i as f64 * 0.3).sin();
            tick(1_700_000_000_000 + i * 7 * SEC, value, 1.0 + (i % 4) as f64)
        })
        .collect();

    let run = || {
        let mut manager = price_manager();
        manager.add_data_points("X", &ticks).unwrap();
        manager
            .query_aggregated_data(&AggregationQuery::new("X", Granularity::Minute5, 0, i64::MAX))
            .unwrap()
    };

    let a = run();
    let b = run();
    assert!(!a.is_empty());
    assert_eq!(a, b);
    for c in &a {
        assert_eq!(c.start % Granularity::Minute5.duration_ms(), 0);
    }
}

/// Query results serialize to the JSON shape served to chart clients.
#[test]
fn test_candle_json() {
    let mut manager = price_manager();
    manager.add_data_point("X", tick(0, 1.0, 0.0)).unwrap();
    manager.add_data_point("X", tick(MIN, 1.0, 0.0)).unwrap();

    let candle = manager
        .get_latest_data("X", Granularity::Minute1)
        .unwrap()
        .unwrap();
    let json = serde_json::to_value(candle).unwrap();
    assert_eq!(json["granularity"], "1m");
    assert_eq!(json["start"], 0);
    assert!(json["vwap"].is_null());
}
