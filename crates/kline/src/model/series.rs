//! Series definitions: identity and behaviour contract for one named stream.

use crate::model::SeriesId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Classification of the values carried by a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    /// Always meaningful, e.g. a trade price.
    Continuous,
    /// Event-counted, e.g. traded volume.
    Discrete,
}

/// A metric a series materializes into its candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// First value in the window.
    Open,
    /// Highest value in the window.
    High,
    /// Lowest value in the window.
    Low,
    /// Last value in the window.
    Close,
    /// Summed volume.
    Volume,
    /// Volume-weighted average price.
    Vwap,
}

impl Metric {
    /// Every metric.
    pub const ALL: [Metric; 6] = [
        Metric::Open,
        Metric::High,
        Metric::Low,
        Metric::Close,
        Metric::Volume,
        Metric::Vwap,
    ];
}

/// How empty buckets are rendered by gap-filled queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDataStrategy {
    /// Repeat the previous close as a flat candle.
    CarryForward,
    /// Emit an all-zero candle.
    FillZero,
}

/// Identity and behaviour contract for one named series.
///
/// Immutable once registered with the manager.
///
/// # Examples
/// ```
/// use alopex_kline::{DataType, Metric, MissingDataStrategy, SeriesDefinition};
///
/// let def = SeriesDefinition::continuous("AAPL.price", "Apple price");
/// assert_eq!(def.data_type, DataType::Continuous);
/// assert_eq!(def.missing_data, MissingDataStrategy::CarryForward);
/// assert!(def.computes(Metric::Vwap));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDefinition {
    /// Unique series identifier.
    pub id: SeriesId,
    /// Display name.
    pub name: String,
    /// Data classification.
    pub data_type: DataType,
    /// Metrics to materialize.
    pub metrics: BTreeSet<Metric>,
    /// Gap rendering strategy.
    pub missing_data: MissingDataStrategy,
}

impl SeriesDefinition {
    /// Creates a definition computing every metric.
    ///
    /// Continuous series carry the previous close across gaps; discrete
    /// series fill gaps with zero.
    pub fn new(id: impl Into<SeriesId>, name: impl Into<String>, data_type: DataType) -> Self {
        let missing_data = match data_type {
            DataType::Continuous => MissingDataStrategy::CarryForward,
            DataType::Discrete => MissingDataStrategy::FillZero,
        };
        Self {
            id: id.into(),
            name: name.into(),
            data_type,
            metrics: Metric::ALL.into_iter().collect(),
            missing_data,
        }
    }

    /// Creates a continuous (price-like) definition.
    pub fn continuous(id: impl Into<SeriesId>, name: impl Into<String>) -> Self {
        Self::new(id, name, DataType::Continuous)
    }

    /// Creates a discrete (volume-like) definition.
    pub fn discrete(id: impl Into<SeriesId>, name: impl Into<String>) -> Self {
        Self::new(id, name, DataType::Discrete)
    }

    /// Replaces the metric set.
    pub fn with_metrics(mut self, metrics: impl IntoIterator<Item = Metric>) -> Self {
        self.metrics = metrics.into_iter().collect();
        self
    }

    /// Replaces the missing-data strategy.
    pub fn with_missing_data(mut self, strategy: MissingDataStrategy) -> Self {
        self.missing_data = strategy;
        self
    }

    /// Returns true if the series materializes `metric`.
    pub fn computes(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }
}
