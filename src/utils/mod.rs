//! # Utility Modules
//!
//! - **Logging**: `tracing-subscriber` setup from configuration
//! - **Metrics**: thread-safe decode, build and socket counters

pub mod logging;
pub mod metrics;

pub use metrics::{global_metrics, Metrics, MetricsSnapshot};
