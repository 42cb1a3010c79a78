//! Lifecycle management modules for candle retention.

pub mod retention;

pub use retention::{DefaultRetentionPolicy, RetentionManager, RetentionPolicy};
