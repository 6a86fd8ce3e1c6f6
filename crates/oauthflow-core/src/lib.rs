//! Core types: tracing setup and calendar query windows

pub mod time;
pub mod tracing;

pub use time::{DateWindow, QUERY_DATE_FORMAT, WindowError, format_utc, parse_query_date};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
