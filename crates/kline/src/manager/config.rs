//! Configuration for the time-series manager.

/// Default for [`ManagerConfig::retain_raw_points`].
pub const DEFAULT_RETAIN_RAW_POINTS: bool = true;

/// Default for [`ManagerConfig::max_filled_points`].
pub const DEFAULT_MAX_FILLED_POINTS: usize = 10_000;

/// What `create_series` does when the id is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateSeriesPolicy {
    /// Fail with `KlineError::DuplicateSeries` and keep the existing series.
    #[default]
    Reject,
    /// Replace the definition and discard all derived state of the old series.
    Replace,
}

/// Configuration for the time-series manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Behaviour on duplicate series registration.
    ///
    /// Default: [`DuplicateSeriesPolicy::Reject`].
    pub duplicate_series: DuplicateSeriesPolicy,

    /// Keep raw points inside each open window.
    ///
    /// Candles are computed from the accumulator alone, so turning this off
    /// only loses the ability to inspect the raw buffer of an open window.
    /// Default: true.
    pub retain_raw_points: bool,

    /// Maximum materialized candles kept per series per granularity.
    ///
    /// When exceeded the oldest candle is evicted. Default: unbounded.
    pub max_points_per_granularity: Option<usize>,

    /// Maximum length of a gap-filled query result.
    ///
    /// Once reached, no further synthetic candles are generated; stored
    /// candles are still returned. Default: 10,000.
    pub max_filled_points: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            duplicate_series: DuplicateSeriesPolicy::default(),
            retain_raw_points: DEFAULT_RETAIN_RAW_POINTS,
            max_points_per_granularity: None,
            max_filled_points: DEFAULT_MAX_FILLED_POINTS,
        }
    }
}

impl ManagerConfig {
    /// Sets the duplicate series policy.
    pub fn with_duplicate_series(mut self, policy: DuplicateSeriesPolicy) -> Self {
        self.duplicate_series = policy;
        self
    }

    /// Sets whether open windows buffer raw points.
    pub fn with_retain_raw_points(mut self, retain: bool) -> Self {
        self.retain_raw_points = retain;
        self
    }

    /// Caps materialized candles per series per granularity.
    pub fn with_max_points_per_granularity(mut self, max: usize) -> Self {
        self.max_points_per_granularity = Some(max);
        self
    }

    /// Caps the length of gap-filled query results.
    pub fn with_max_filled_points(mut self, max: usize) -> Self {
        self.max_filled_points = max;
        self
    }
}
