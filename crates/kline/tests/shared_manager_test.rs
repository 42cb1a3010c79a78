//! Concurrency tests for the shared manager handle.
//!
//! One writer thread per series feeds ticks while a reader thread queries;
//! the coarse lock must keep every series' candles consistent.

use alopex_kline::{
    AggregationQuery, DataPoint, Granularity, SeriesDefinition, SharedTimeSeriesManager,
};
use std::thread;

const MIN: i64 = 60_000;
const TICKS_PER_SERIES: i64 = 2_000;

#[test]
fn test_concurrent_writers_per_series() {
    let shared = SharedTimeSeriesManager::default();
    let ids: Vec<String> = (0..4).map(|i| format!("S{}", i)).collect();
    for id in &ids {
        shared
            .create_series(SeriesDefinition::continuous(id.as_str(), id.as_str()))
            .unwrap();
    }

    let writers: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let handle = shared.clone();
            thread::spawn(move || {
                for i in 0..TICKS_PER_SERIES {
                    handle
                        .add_data_point(&id, DataPoint::new(i * 15_000, i as f64).with_volume(1.0))
                        .unwrap();
                }
            })
        })
        .collect();

    let reader = {
        let handle = shared.clone();
        thread::spawn(move || {
            for _ in 0..200 {
                let candles = handle
                    .query_aggregated_data(&AggregationQuery::new("S0", Granularity::Minute1, 0, i64::MAX))
                    .unwrap();
                for pair in candles.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                }
            }
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    reader.join().unwrap();

    // 2000 ticks every 15s span 500 minutes; the last minute is still open.
    for id in &ids {
        let candles = shared
            .query_aggregated_data(&AggregationQuery::new(id.as_str(), Granularity::Minute1, 0, i64::MAX))
            .unwrap();
        assert_eq!(candles.len(), 499);
        assert!(candles.iter().all(|c| c.count == 4));
        assert_eq!(candles[0].end, MIN);
    }
    assert_eq!(shared.stats().ingested_points, 4 * TICKS_PER_SERIES as u64);
}

#[test]
fn test_lifecycle_under_concurrency() {
    let shared = SharedTimeSeriesManager::default();
    shared
        .create_series(SeriesDefinition::continuous("keep", "keep"))
        .unwrap();

    let churn = {
        let handle = shared.clone();
        thread::spawn(move || {
            for i in 0..100 {
                let id = format!("tmp{}", i);
                handle
                    .create_series(SeriesDefinition::discrete(id.as_str(), "tmp"))
                    .unwrap();
                handle.add_data_point(&id, DataPoint::new(0, 1.0)).unwrap();
                assert!(handle.remove_series(&id));
            }
        })
    };

    for i in 0..100 {
        shared.add_data_point("keep", DataPoint::new(i * MIN, 1.0)).unwrap();
    }
    churn.join().unwrap();

    let stats = shared.stats();
    assert_eq!(stats.series_count, 1);
    assert_eq!(stats.ingested_points, 200);
    assert_eq!(
        shared.get_latest_data("keep", Granularity::Minute1).unwrap().map(|c| c.start),
        Some(98 * MIN)
    );
}
