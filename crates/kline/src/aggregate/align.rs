//! Natural-boundary alignment of timestamps to granularity buckets.

use crate::model::{Granularity, SeriesId, Timestamp};
use std::fmt;

/// Returns the aligned start of the bucket containing `timestamp`.
///
/// The result is `floor(timestamp / duration) * duration`, so every boundary
/// is an exact multiple of the duration since the epoch. Negative timestamps
/// floor towards negative infinity.
///
/// # Examples
/// ```
/// use alopex_kline::{align_to_granularity, Granularity};
///
/// assert_eq!(align_to_granularity(65_000, Granularity::Minute1), 60_000);
/// assert_eq!(align_to_granularity(-1, Granularity::Minute1), -60_000);
/// ```
pub fn align_to_granularity(timestamp: Timestamp, granularity: Granularity) -> Timestamp {
    let duration = granularity.duration_ms();
    timestamp.div_euclid(duration) * duration
}

/// Returns the exclusive end of the bucket containing `timestamp`.
pub fn window_end(timestamp: Timestamp, granularity: Granularity) -> Timestamp {
    align_to_granularity(timestamp, granularity) + granularity.duration_ms()
}

/// Identity of one active window: `series:granularity:aligned_start`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowKey {
    /// Owning series.
    pub series_id: SeriesId,
    /// Bucket granularity.
    pub granularity: Granularity,
    /// Aligned bucket start.
    pub start: Timestamp,
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.series_id, self.granularity, self.start)
    }
}

/// Computes the key of the window that `timestamp` falls into.
pub fn window_key(series_id: &str, granularity: Granularity, timestamp: Timestamp) -> WindowKey {
    WindowKey {
        series_id: series_id.to_string(),
        granularity,
        start: align_to_granularity(timestamp, granularity),
    }
}
