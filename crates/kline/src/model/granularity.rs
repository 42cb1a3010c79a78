//! The eleven fixed candle granularities.

use crate::error::KlineError;
use crate::model::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MINUTE_MS: i64 = 60 * 1000;
const DAY_MS: i64 = 24 * 60 * MINUTE_MS;

/// Bucket duration used to aggregate a series.
///
/// Every bucket boundary is an exact multiple of the duration since the Unix
/// epoch, so two managers fed the same data produce identical boundaries.
///
/// # Examples
/// ```
/// use alopex_kline::Granularity;
///
/// assert_eq!(Granularity::Minute5.duration_ms(), 300_000);
/// assert_eq!("15m".parse::<Granularity>().unwrap(), Granularity::Minute15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// One minute.
    #[serde(rename = "1m")]
    Minute1,
    /// Five minutes.
    #[serde(rename = "5m")]
    Minute5,
    /// Fifteen minutes.
    #[serde(rename = "15m")]
    Minute15,
    /// Thirty minutes.
    #[serde(rename = "30m")]
    Minute30,
    /// Sixty minutes.
    #[serde(rename = "60m")]
    Minute60,
    /// One hundred twenty minutes.
    #[serde(rename = "120m")]
    Minute120,
    /// One day.
    #[serde(rename = "1d")]
    Day1,
    /// Five days.
    #[serde(rename = "5d")]
    Day5,
    /// Twenty days.
    #[serde(rename = "20d")]
    Day20,
    /// One hundred twenty days.
    #[serde(rename = "120d")]
    Day120,
    /// Two hundred fifty days.
    #[serde(rename = "250d")]
    Day250,
}

impl Granularity {
    /// All granularities, finest first.
    pub const ALL: [Granularity; 11] = [
        Granularity::Minute1,
        Granularity::Minute5,
        Granularity::Minute15,
        Granularity::Minute30,
        Granularity::Minute60,
        Granularity::Minute120,
        Granularity::Day1,
        Granularity::Day5,
        Granularity::Day20,
        Granularity::Day120,
        Granularity::Day250,
    ];

    /// Duration of the coarsest granularity in milliseconds.
    pub const MAX_DURATION_MS: i64 = 250 * DAY_MS;

    /// Returns the bucket duration in milliseconds.
    pub const fn duration_ms(self) -> Timestamp {
        match self {
            Self::Minute1 => MINUTE_MS,
            Self::Minute5 => 5 * MINUTE_MS,
            Self::Minute15 => 15 * MINUTE_MS,
            Self::Minute30 => 30 * MINUTE_MS,
            Self::Minute60 => 60 * MINUTE_MS,
            Self::Minute120 => 120 * MINUTE_MS,
            Self::Day1 => DAY_MS,
            Self::Day5 => 5 * DAY_MS,
            Self::Day20 => 20 * DAY_MS,
            Self::Day120 => 120 * DAY_MS,
            Self::Day250 => Self::MAX_DURATION_MS,
        }
    }

    /// Returns the short label, e.g. `"1m"` or `"250d"`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute5 => "5m",
            Self::Minute15 => "15m",
            Self::Minute30 => "30m",
            Self::Minute60 => "60m",
            Self::Minute120 => "120m",
            Self::Day1 => "1d",
            Self::Day5 => "5d",
            Self::Day20 => "20d",
            Self::Day120 => "120d",
            Self::Day250 => "250d",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Granularity {
    type Err = KlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.label() == s)
            .ok_or_else(|| KlineError::UnknownGranularity(s.to_string()))
    }
}
