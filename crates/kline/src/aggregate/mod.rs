//! Bucket alignment, incremental accumulation and open windows.

pub mod accumulator;
pub mod align;
pub mod window;

pub use accumulator::Accumulator;
pub use align::{align_to_granularity, window_end, window_key, WindowKey};
pub use window::TimeWindow;
