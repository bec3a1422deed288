pub mod limiter;
pub mod monitor;

pub use limiter::{BandwidthLimiter, MessageSize};
pub use monitor::ThroughputMonitor;
