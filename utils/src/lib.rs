//! Shared utilities for repwatch.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::{format_days_since, format_duration};
